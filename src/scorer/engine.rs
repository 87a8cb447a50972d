use super::delta::LineTotals;
use super::lines::LineCategory;
use super::types::{CategoryBreakdown, CostBreakdown, LineReport};
use super::CostModel;
use crate::cube::{coord_of, CubeState};

const WORST_LINES: usize = 5;

/// Fast Path: line sums plus aggregate totals, used by the optimizers.
pub fn score_full(model: &CostModel, values: &[u32]) -> (Vec<i64>, LineTotals) {
    let lines = model.lines();
    let sums: Vec<i64> = (0..lines.len()).map(|l| lines.line_sum(values, l)).collect();
    let totals = totals_from_sums(model, &sums);
    (sums, totals)
}

pub fn totals_from_sums(model: &CostModel, sums: &[i64]) -> LineTotals {
    let lines = model.lines();
    let mut totals = LineTotals::default();
    for (line, &sum) in sums.iter().enumerate() {
        totals.add(model, lines.category(line), model.deviation(sum));
    }
    totals
}

/// Detailed Path: per-category statistics and the worst lines.
pub fn score_debug(model: &CostModel, cube: &CubeState) -> CostBreakdown {
    let lines = model.lines();
    let size = cube.size();
    let (sums, totals) = score_full(model, cube.values());

    let mut categories: Vec<CategoryBreakdown> = LineCategory::ALL
        .iter()
        .map(|&category| CategoryBreakdown {
            category,
            lines: 0,
            violations: 0,
            total_deviation: 0,
            max_deviation: 0,
            penalized_lines: 0,
        })
        .collect();

    for (line, &sum) in sums.iter().enumerate() {
        let cat = lines.category(line);
        let d = model.deviation(sum);
        let entry = &mut categories[cat.index()];
        entry.lines += 1;
        entry.total_deviation += d;
        entry.max_deviation = entry.max_deviation.max(d);
        if d != 0 {
            entry.violations += 1;
        }
        if model.is_penalized(cat, d) {
            entry.penalized_lines += 1;
        }
    }

    let mut order: Vec<usize> = (0..sums.len())
        .filter(|&l| sums[l] != model.magic_number())
        .collect();
    // Stable: equal deviations keep line order
    order.sort_by_key(|&l| std::cmp::Reverse(model.deviation(sums[l])));
    let worst_lines = order
        .into_iter()
        .take(WORST_LINES)
        .map(|line| LineReport {
            line,
            category: lines.category(line),
            cells: lines
                .cells(line)
                .iter()
                .map(|&c| coord_of(size, c))
                .collect(),
            sum: sums[line],
            deviation: model.deviation(sums[line]),
        })
        .collect();

    CostBreakdown {
        size,
        magic_number: model.magic_number(),
        total_lines: lines.len(),
        violations: totals.violations,
        weighted_cost: model.weighted_from(&totals),
        deviation_std: totals.deviation_std(),
        categories,
        worst_lines,
    }
}
