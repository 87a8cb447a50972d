use super::engine;
use super::lines::{LineCategory, LineSet};
use super::{CostModel, Objective};
use crate::cube::CubeState;

/// Exact integer aggregates over all line deviations.
///
/// Both cost functions are derived from these, so a value obtained by
/// applying swap deltas is bit-identical to one from a full pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineTotals {
    pub lines: usize,
    pub violations: usize,
    pub deviation: [i64; LineCategory::COUNT],
    pub penalized: [i64; LineCategory::COUNT],
    pub sum_dev: i64,
    pub sum_sq_dev: i128,
}

impl LineTotals {
    #[inline(always)]
    pub fn add(&mut self, model: &CostModel, category: LineCategory, d: i64) {
        let c = category.index();
        self.lines += 1;
        if d != 0 {
            self.violations += 1;
        }
        self.deviation[c] += d;
        if model.is_penalized(category, d) {
            self.penalized[c] += d;
        }
        self.sum_dev += d;
        self.sum_sq_dev += (d as i128) * (d as i128);
    }

    #[inline(always)]
    pub fn remove(&mut self, model: &CostModel, category: LineCategory, d: i64) {
        let c = category.index();
        self.lines -= 1;
        if d != 0 {
            self.violations -= 1;
        }
        self.deviation[c] -= d;
        if model.is_penalized(category, d) {
            self.penalized[c] -= d;
        }
        self.sum_dev -= d;
        self.sum_sq_dev -= (d as i128) * (d as i128);
    }

    /// Population standard deviation of the line deviations.
    pub fn deviation_std(&self) -> f64 {
        if self.lines == 0 {
            return 0.0;
        }
        let n = self.lines as i128;
        let s = self.sum_dev as i128;
        let numer = n * self.sum_sq_dev - s * s;
        if numer <= 0 {
            return 0.0;
        }
        (numer as f64 / (n * n) as f64).sqrt()
    }

    #[inline(always)]
    pub fn is_solved(&self) -> bool {
        self.violations == 0
    }
}

/// A cube together with its cached line sums and totals.
#[derive(Debug, Clone)]
pub struct ScoredCube {
    cube: CubeState,
    sums: Vec<i64>,
    totals: LineTotals,
}

impl ScoredCube {
    pub fn new(model: &CostModel, cube: CubeState) -> Self {
        let (sums, totals) = engine::score_full(model, cube.values());
        Self { cube, sums, totals }
    }

    #[inline(always)]
    pub fn cube(&self) -> &CubeState {
        &self.cube
    }

    pub fn into_cube(self) -> CubeState {
        self.cube
    }

    #[inline(always)]
    pub fn sums(&self) -> &[i64] {
        &self.sums
    }

    #[inline(always)]
    pub fn totals(&self) -> &LineTotals {
        &self.totals
    }

    #[inline(always)]
    pub fn cost(&self, model: &CostModel, objective: Objective) -> f64 {
        model.cost_of(&self.totals, objective)
    }

    #[inline(always)]
    pub fn is_solved(&self) -> bool {
        self.totals.is_solved()
    }

    #[inline(always)]
    pub fn line_deviation(&self, model: &CostModel, line: usize) -> i64 {
        model.deviation(self.sums[line])
    }

    /// Totals after exchanging cells `a` and `b`, without committing.
    pub fn swap_totals(&self, model: &CostModel, a: usize, b: usize) -> LineTotals {
        let mut totals = self.totals;
        if a == b {
            return totals;
        }
        let delta = self.cube.value(b) as i64 - self.cube.value(a) as i64;
        for_each_shift(model.lines(), a, b, delta, |line, shift| {
            let cat = model.lines().category(line);
            let old = self.sums[line];
            totals.remove(model, cat, model.deviation(old));
            totals.add(model, cat, model.deviation(old + shift));
        });
        totals
    }

    #[inline]
    pub fn swap_cost(&self, model: &CostModel, a: usize, b: usize, objective: Objective) -> f64 {
        model.cost_of(&self.swap_totals(model, a, b), objective)
    }

    /// Commits the exchange of cells `a` and `b`.
    pub fn apply_swap(&mut self, model: &CostModel, a: usize, b: usize) {
        if a == b {
            return;
        }
        let delta = self.cube.value(b) as i64 - self.cube.value(a) as i64;
        let sums = &mut self.sums;
        let totals = &mut self.totals;
        for_each_shift(model.lines(), a, b, delta, |line, shift| {
            let cat = model.lines().category(line);
            let old = sums[line];
            totals.remove(model, cat, model.deviation(old));
            sums[line] = old + shift;
            totals.add(model, cat, model.deviation(old + shift));
        });
        self.cube.swap(a, b);
    }
}

/// Visits each line whose sum changes when `a` takes `b`'s value and vice
/// versa. Lines through both cells are unchanged and skipped.
#[inline(always)]
fn for_each_shift<F: FnMut(usize, i64)>(lines: &LineSet, a: usize, b: usize, delta: i64, mut f: F) {
    let la = lines.lines_through(a);
    let lb = lines.lines_through(b);
    for &l in la {
        if !lb.contains(&l) {
            f(l as usize, delta);
        }
    }
    for &l in lb {
        if !la.contains(&l) {
            f(l as usize, -delta);
        }
    }
}
