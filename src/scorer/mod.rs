pub mod delta;
pub mod engine;
pub mod lines;
pub mod types;

pub use self::delta::{LineTotals, ScoredCube};
pub use self::lines::{LineCategory, LineSet};
pub use self::types::CostBreakdown;

use crate::config::CostWeights;
use crate::cube::{magic_number, CubeState};
use crate::error::{MagicCubeError, McResult};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Which number a strategy minimizes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Count of lines whose sum differs from the magic number.
    Violations,
    /// Category-weighted deviation with penalty and balance terms.
    Weighted,
}

/// Pure scoring of cube states against the magic-cube line constraints.
pub struct CostModel {
    pub weights: CostWeights,
    lines: LineSet,
    magic_number: i64,

    // Per-category tables, indexed by LineCategory::index()
    category_weight: [f64; LineCategory::COUNT],
    penalty_scale: [f64; LineCategory::COUNT],
    penalty_limit: [f64; LineCategory::COUNT],
}

impl CostModel {
    pub fn new(size: usize, weights: CostWeights) -> McResult<Self> {
        if size == 0 {
            return Err(MagicCubeError::InvalidSize(size));
        }
        let m = magic_number(size);
        let w = &weights;
        let category_weight = [
            w.weight_row,
            w.weight_column,
            w.weight_pillar,
            w.weight_level_diagonal,
            w.weight_space_diagonal,
        ];
        let penalty_scale = [
            1.0,
            1.0,
            1.0,
            w.penalty_scale_level_diagonal,
            w.penalty_scale_space_diagonal,
        ];
        let thresholds = [
            w.threshold_row,
            w.threshold_column,
            w.threshold_pillar,
            w.threshold_level_diagonal,
            w.threshold_space_diagonal,
        ];
        let penalty_limit = thresholds.map(|t| t * m as f64);

        Ok(Self {
            weights,
            lines: LineSet::new(size),
            magic_number: m,
            category_weight,
            penalty_scale,
            penalty_limit,
        })
    }

    pub fn standard(size: usize) -> McResult<Self> {
        Self::new(size, CostWeights::default())
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.lines.size()
    }

    #[inline(always)]
    pub fn magic_number(&self) -> i64 {
        self.magic_number
    }

    #[inline(always)]
    pub fn lines(&self) -> &LineSet {
        &self.lines
    }

    /// Fails when `cube` was built for a different size than this model.
    pub fn check_cube(&self, cube: &CubeState) -> McResult<()> {
        if cube.size() != self.size() {
            let n = self.size();
            return Err(MagicCubeError::GridLength {
                expected: n * n * n,
                actual: cube.len(),
            });
        }
        Ok(())
    }

    pub fn violation_count(&self, cube: &CubeState) -> usize {
        engine::score_full(self, cube.values()).1.violations
    }

    pub fn weighted_cost(&self, cube: &CubeState) -> f64 {
        let (_, totals) = engine::score_full(self, cube.values());
        self.weighted_from(&totals)
    }

    pub fn cost(&self, cube: &CubeState, objective: Objective) -> f64 {
        let (_, totals) = engine::score_full(self, cube.values());
        self.cost_of(&totals, objective)
    }

    pub fn evaluate(&self, cube: &CubeState) -> CostBreakdown {
        engine::score_debug(self, cube)
    }

    #[inline]
    pub fn cost_of(&self, totals: &LineTotals, objective: Objective) -> f64 {
        match objective {
            Objective::Violations => totals.violations as f64,
            Objective::Weighted => self.weighted_from(totals),
        }
    }

    /// Weighted cost from aggregates. Identical for incrementally updated
    /// and freshly computed totals.
    pub fn weighted_from(&self, totals: &LineTotals) -> f64 {
        let mut cost = 0.0;
        for c in 0..LineCategory::COUNT {
            cost += self.category_weight[c] * totals.deviation[c] as f64;
            cost += self.weights.deviation_penalty
                * self.penalty_scale[c]
                * totals.penalized[c] as f64;
        }
        cost + self.weights.balance_weight * totals.deviation_std()
    }

    #[inline(always)]
    pub fn is_penalized(&self, category: LineCategory, deviation: i64) -> bool {
        deviation as f64 > self.penalty_limit[category.index()]
    }

    #[inline(always)]
    pub fn deviation(&self, sum: i64) -> i64 {
        (sum - self.magic_number).abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3x3x3 with every row, column and pillar summing to 42.
    fn semi_perfect_three() -> CubeState {
        let grid = vec![
            vec![vec![8, 24, 10], vec![12, 7, 23], vec![22, 11, 9]],
            vec![vec![15, 1, 26], vec![25, 14, 3], vec![2, 27, 13]],
            vec![vec![19, 17, 6], vec![5, 21, 16], vec![18, 4, 20]],
        ];
        CubeState::from_nested(&grid).unwrap()
    }

    #[test]
    fn test_magic_lines_are_not_violations() {
        let model = CostModel::standard(3).unwrap();
        let cube = semi_perfect_three();
        let breakdown = model.evaluate(&cube);
        for cat in &breakdown.categories {
            if matches!(
                cat.category,
                LineCategory::Row | LineCategory::Column | LineCategory::Pillar
            ) {
                assert_eq!(cat.violations, 0, "{:?}", cat.category);
            }
        }
        assert_eq!(model.violation_count(&cube), breakdown.violations);
        assert!(breakdown.violations > 0);
    }

    #[test]
    fn test_single_cell_cube_is_solved() {
        let model = CostModel::standard(1).unwrap();
        let cube = CubeState::from_flat(1, vec![1]).unwrap();
        assert_eq!(model.violation_count(&cube), 0);
        assert_eq!(model.weighted_cost(&cube), 0.0);
    }

    #[test]
    fn test_weighted_cost_by_hand() {
        // N=2, M=9. Identity cube: rows 3,7,11,15; cols 4,6,12,14;
        // pillars 6,8,10,12; level diags 5,5,13,13; space diags 9,9,9,9.
        let model = CostModel::standard(2).unwrap();
        let cube = CubeState::from_flat(2, (1..=8).collect()).unwrap();

        let devs: [i64; 20] = [
            6, 2, 2, 6, // rows
            5, 3, 3, 5, // columns
            3, 1, 1, 3, // pillars
            4, 4, 4, 4, // level diagonals
            0, 0, 0, 0, // space diagonals
        ];
        assert_eq!(model.violation_count(&cube), 16);

        // Penalty limits: 0.2*9 = 1.8 for straight lines, 0.15*9 = 1.35 for
        // level diagonals.
        let straight = 1.0 * 16.0 + 1.0 * 16.0 + 1.2 * 8.0;
        let diag = 1.5 * 16.0;
        let penalty = 0.1 * (16.0 + 16.0 + 6.0) + 0.1 * 1.5 * 16.0;
        let mean = devs.iter().sum::<i64>() as f64 / 20.0;
        let var = devs
            .iter()
            .map(|&d| (d as f64 - mean).powi(2))
            .sum::<f64>()
            / 20.0;
        let expected = straight + diag + penalty + 0.5 * var.sqrt();

        assert!((model.weighted_cost(&cube) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_size_mismatch() {
        let model = CostModel::standard(3).unwrap();
        let cube = CubeState::from_flat(2, (1..=8).collect()).unwrap();
        assert!(model.check_cube(&cube).is_err());
        assert!(CostModel::standard(0).is_err());
    }
}
