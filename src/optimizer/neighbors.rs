use crate::cube::{coord_of, CubeState};
use crate::scorer::{CostModel, LineCategory, Objective, ScoredCube};
use fastrand::Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Reverse;
use strum_macros::Display;

/// Where a candidate swap came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CandidateKind {
    WithinLine,
    CrossLine,
    Random,
    Exhaustive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub first: usize,
    pub second: usize,
    pub kind: CandidateKind,
}

/// Knobs for the deviation-targeted neighbor.
#[derive(Debug, Clone, Copy)]
pub struct IntelligentParams {
    // Chance of a targeted move; otherwise a uniform pair
    pub bias: f64,
    pub hot_line_fraction: f64,
    pub match_fraction: f64,
}

/// The base move: a copy of `cube` with two cells exchanged.
#[inline]
pub fn swap_neighbor(cube: &CubeState, a: usize, b: usize) -> CubeState {
    cube.swapped(a, b)
}

/// Every unordered pair `(a, b)` with `a < b`, in positional order.
pub fn all_pairs(len: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..len).flat_map(move |a| (a + 1..len).map(move |b| (a, b)))
}

/// Lazy all-pairs neighborhood with the objective value after each swap.
pub fn neighborhood<'a>(
    model: &'a CostModel,
    scored: &'a ScoredCube,
    objective: Objective,
) -> impl Iterator<Item = (usize, usize, f64)> + 'a {
    all_pairs(scored.cube().len()).map(move |(a, b)| (a, b, scored.swap_cost(model, a, b, objective)))
}

/// Lowest-cost swap over the whole neighborhood, evaluated in parallel.
/// Ties go to the pair that comes first in `all_pairs` order.
pub fn best_swap(
    model: &CostModel,
    scored: &ScoredCube,
    objective: Objective,
) -> Option<(usize, usize, f64)> {
    let len = scored.cube().len();
    (0..len)
        .into_par_iter()
        .flat_map_iter(|a| (a + 1..len).map(move |b| (a, b)))
        .map(|(a, b)| (a, b, scored.swap_cost(model, a, b, objective)))
        .reduce_with(|x, y| if precedes(&y, &x) { y } else { x })
}

#[inline(always)]
fn precedes(x: &(usize, usize, f64), y: &(usize, usize, f64)) -> bool {
    x.2 < y.2 || (x.2 == y.2 && (x.0, x.1) < (y.0, y.1))
}

/// Objective value after each candidate swap, in candidate order.
pub fn score_candidates(
    model: &CostModel,
    scored: &ScoredCube,
    objective: Objective,
    candidates: &[Candidate],
) -> Vec<f64> {
    candidates
        .par_iter()
        .map(|c| scored.swap_cost(model, c.first, c.second, objective))
        .collect()
}

pub fn exhaustive_candidates(len: usize) -> Vec<Candidate> {
    all_pairs(len)
        .map(|(first, second)| Candidate {
            first,
            second,
            kind: CandidateKind::Exhaustive,
        })
        .collect()
}

/// Uniform pair of distinct cells. `None` when the grid has one cell.
pub fn random_pair(rng: &mut Rng, len: usize) -> Option<(usize, usize)> {
    if len < 2 {
        return None;
    }
    let a = rng.usize(..len);
    Some((a, random_other(rng, len, a)))
}

#[inline]
fn random_other(rng: &mut Rng, len: usize, exclude: usize) -> usize {
    let b = rng.usize(..len - 1);
    if b >= exclude {
        b + 1
    } else {
        b
    }
}

/// Pair aimed at the lines furthest from the magic number.
///
/// The first cell is drawn from lines deviating by more than
/// `hot_line_fraction·M`. The second is a cell whose value would bring the
/// worst line through the first cell close to `M`.
pub fn intelligent_pair(
    model: &CostModel,
    scored: &ScoredCube,
    rng: &mut Rng,
    params: &IntelligentParams,
) -> Option<(usize, usize)> {
    let len = scored.cube().len();
    if len < 2 {
        return None;
    }
    if rng.f64() >= params.bias {
        return random_pair(rng, len);
    }

    let lines = model.lines();
    let m = model.magic_number();
    let hot_limit = m as f64 * params.hot_line_fraction;

    let mut on_hot = vec![false; len];
    let mut hot = Vec::new();
    for line in 0..lines.len() {
        if scored.line_deviation(model, line) as f64 > hot_limit {
            for &c in lines.cells(line) {
                if !on_hot[c] {
                    on_hot[c] = true;
                    hot.push(c);
                }
            }
        }
    }
    if hot.is_empty() {
        return random_pair(rng, len);
    }

    let pos1 = hot[rng.usize(..hot.len())];
    let worst = lines
        .lines_through(pos1)
        .iter()
        .map(|&l| l as usize)
        .max_by_key(|&l| (scored.line_deviation(model, l), Reverse(l)))?;
    let v1 = scored.cube().value(pos1) as i64;
    let desired = m - (scored.sums()[worst] - v1);
    let tolerance = m as f64 * params.match_fraction;

    let matches: Vec<usize> = (0..len)
        .filter(|&c| c != pos1)
        .filter(|&c| ((scored.cube().value(c) as i64 - desired).abs() as f64) < tolerance)
        .collect();
    let pos2 = if matches.is_empty() {
        random_other(rng, len, pos1)
    } else {
        matches[rng.usize(..matches.len())]
    };
    Some((pos1, pos2))
}

/// 2 to 4 positions, each sharing a level, row or column with the one
/// before it. Consecutive positions are swapped in order.
pub fn multi_swap_chain(size: usize, rng: &mut Rng) -> Vec<usize> {
    let len = size * size * size;
    if len < 2 {
        return Vec::new();
    }
    let count = rng.usize(2..=4).min(len);
    let mut chain = vec![rng.usize(..len)];

    while chain.len() < count {
        let last = match chain.last() {
            Some(&p) => coord_of(size, p),
            None => break,
        };
        let related: Vec<usize> = (0..len)
            .filter(|c| !chain.contains(c))
            .filter(|&c| {
                let p = coord_of(size, c);
                p.level == last.level || p.row == last.row || p.col == last.col
            })
            .collect();
        let next = if related.is_empty() {
            rng.usize(..len)
        } else {
            related[rng.usize(..related.len())]
        };
        chain.push(next);
    }
    chain
}

/// Applies a chain produced by [`multi_swap_chain`].
pub fn apply_chain(model: &CostModel, scored: &mut ScoredCube, chain: &[usize]) {
    for pair in chain.windows(2) {
        scored.apply_swap(model, pair[0], pair[1]);
    }
}

/// Candidates concentrated on the worst lines of each category.
///
/// Within-line pairs cover every pair inside the `top_lines` worst lines per
/// category; each pair of those lines contributes one cross-line pair of
/// random representatives; a quarter as many uniform pairs are added for
/// diversity. The result is shuffled.
pub fn guided_candidates(
    model: &CostModel,
    scored: &ScoredCube,
    rng: &mut Rng,
    top_lines: usize,
) -> Vec<Candidate> {
    let lines = model.lines();
    let len = scored.cube().len();
    let mut problems: Vec<usize> = Vec::new();
    for category in LineCategory::ALL {
        let mut of_cat: Vec<usize> = lines.lines_of(category).collect();
        of_cat.sort_by_key(|&l| Reverse(scored.line_deviation(model, l)));
        problems.extend(of_cat.into_iter().take(top_lines));
    }

    let mut candidates = Vec::new();

    // 1. Within-line
    for &line in &problems {
        let cells = lines.cells(line);
        for (i, &first) in cells.iter().enumerate() {
            for &second in &cells[i + 1..] {
                candidates.push(Candidate {
                    first,
                    second,
                    kind: CandidateKind::WithinLine,
                });
            }
        }
    }

    // 2. Cross-line
    for (i, &p) in problems.iter().enumerate() {
        for &q in &problems[i + 1..] {
            let cp = lines.cells(p);
            let cq = lines.cells(q);
            let first = cp[rng.usize(..cp.len())];
            let second = cq[rng.usize(..cq.len())];
            if first != second {
                candidates.push(Candidate {
                    first,
                    second,
                    kind: CandidateKind::CrossLine,
                });
            }
        }
    }

    // 3. Random
    let extra = (candidates.len() / 4).max(1);
    for _ in 0..extra {
        if let Some((first, second)) = random_pair(rng, len) {
            candidates.push(Candidate {
                first,
                second,
                kind: CandidateKind::Random,
            });
        }
    }

    rng.shuffle(&mut candidates);
    candidates
}
