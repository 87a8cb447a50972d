use super::lines::LineCategory;
use crate::cube::Coord;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CategoryBreakdown {
    pub category: LineCategory,
    pub lines: usize,
    pub violations: usize,
    pub total_deviation: i64,
    pub max_deviation: i64,
    // Lines past the category's large-deviation threshold
    pub penalized_lines: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineReport {
    pub line: usize,
    pub category: LineCategory,
    pub cells: Vec<Coord>,
    pub sum: i64,
    pub deviation: i64,
}

/// Detailed scoring of one cube, used by `evaluate`.
#[derive(Debug, Clone, Serialize)]
pub struct CostBreakdown {
    pub size: usize,
    pub magic_number: i64,
    pub total_lines: usize,
    pub violations: usize,
    pub weighted_cost: f64,
    pub deviation_std: f64,
    pub categories: Vec<CategoryBreakdown>,
    pub worst_lines: Vec<LineReport>,
}

impl CostBreakdown {
    pub fn is_solved(&self) -> bool {
        self.violations == 0
    }
}
