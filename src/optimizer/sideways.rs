use super::neighbors::{exhaustive_candidates, guided_candidates, score_candidates, Candidate};
use super::{Strategy, StrategyKind};
use crate::config::{CandidateMode, SidewaysParams};
use crate::cube::CubeState;
use crate::error::McResult;
use crate::recorder::{RunRecord, RunRecorder, SwapStats, Termination};
use crate::scorer::{CostModel, Objective, ScoredCube};
use fastrand::Rng;
use std::collections::VecDeque;
use tracing::{debug, info};

const STATS_INTERVAL: usize = 50;

/// Hill climbing that may cross plateaus with equal-cost moves, guarded by
/// a tabu list of recently accepted pairs.
pub struct SidewaysMove {
    params: SidewaysParams,
}

impl SidewaysMove {
    pub fn new(params: SidewaysParams) -> Self {
        Self { params }
    }
}

#[inline]
fn pair_key(c: &Candidate) -> (usize, usize) {
    (c.first.min(c.second), c.first.max(c.second))
}

impl Strategy for SidewaysMove {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SidewaysMove
    }

    fn objective(&self) -> Objective {
        self.params.objective
    }

    fn run(&self, model: &CostModel, start: CubeState, rng: &mut Rng) -> McResult<RunRecord> {
        model.check_cube(&start)?;
        let p = &self.params;
        let objective = p.objective;
        let len = start.len();
        let mut scored = ScoredCube::new(model, start);
        let mut current = scored.cost(model, objective);
        let mut recorder = RunRecorder::start(self.kind(), objective, model.size(), current);

        let mut tabu: VecDeque<(usize, usize)> = VecDeque::with_capacity(p.tabu_size + 1);
        let mut stats = SwapStats::default();
        let mut sideways_used = 0;
        // Recent accepted pairs, long enough to see a pair come back once it
        // leaves the tabu list
        let window = p.max_repeated_swaps * (p.tabu_size + 1);
        let mut recent: VecDeque<(usize, usize)> = VecDeque::with_capacity(window + 1);
        let mut iterations = 0;

        info!(
            "Sideways move: start cost {:.2}, {} candidates",
            current, p.candidates
        );

        let termination = loop {
            if scored.is_solved() {
                break Termination::Solved;
            }
            if iterations >= p.max_iterations {
                break Termination::BudgetExhausted;
            }

            let candidates = match p.candidates {
                CandidateMode::Exhaustive => exhaustive_candidates(len),
                CandidateMode::Guided => guided_candidates(model, &scored, rng, p.top_lines),
            };
            let costs = score_candidates(model, &scored, objective, &candidates);

            // First lowest strictly-improving candidate, else first equal one
            let mut best: Option<(usize, f64)> = None;
            let mut first_equal: Option<usize> = None;
            for (i, c) in candidates.iter().enumerate() {
                if c.first == c.second || tabu.contains(&pair_key(c)) {
                    continue;
                }
                let cost = costs[i];
                let improved = cost < current;
                stats.record(c.kind, improved);
                if improved {
                    if best.map_or(true, |(_, b)| cost < b) {
                        best = Some((i, cost));
                    }
                } else if cost == current && first_equal.is_none() {
                    first_equal = Some(i);
                }
            }

            let (chosen, cost, sideways) = match (best, first_equal) {
                (Some((i, cost)), _) => (i, cost, false),
                (None, Some(i)) if sideways_used < p.max_sideways_moves => (i, current, true),
                _ => break Termination::PlateauExhausted,
            };

            let c = candidates[chosen];
            scored.apply_swap(model, c.first, c.second);
            recorder.record_move(iterations, c.first, c.second, cost);
            if sideways {
                sideways_used += 1;
                recorder.mark_sideways();
                debug!(
                    "iter {}: sideways {} <-> {} ({}/{})",
                    iterations, c.first, c.second, sideways_used, p.max_sideways_moves
                );
            }
            current = cost;

            let key = pair_key(&c);
            tabu.push_back(key);
            while tabu.len() > p.tabu_size {
                tabu.pop_front();
            }
            recent.push_back(key);
            while recent.len() > window {
                recent.pop_front();
            }
            let repeats = recent.iter().filter(|&&k| k == key).count();

            iterations += 1;
            recorder.record_cost(current);

            if iterations % STATS_INTERVAL == 0 {
                log_stats(iterations, &stats);
            }
            if p.max_repeated_swaps > 0 && repeats >= p.max_repeated_swaps {
                break Termination::RepeatedSwap;
            }
        };

        info!(
            "Sideways move: {} after {} iterations ({} sideways), cost {:.2}",
            termination, iterations, sideways_used, current
        );
        recorder.set_swap_stats(stats);
        Ok(recorder.finish(model, scored.into_cube(), current, iterations, termination))
    }
}

fn log_stats(iteration: usize, stats: &SwapStats) {
    debug!(
        "iter {}: success rates within_line {:.3} ({}), cross_line {:.3} ({}), random {:.3} ({}), exhaustive {:.3} ({})",
        iteration,
        stats.within_line.success_rate(),
        stats.within_line.attempts,
        stats.cross_line.success_rate(),
        stats.cross_line.attempts,
        stats.random.success_rate(),
        stats.random.attempts,
        stats.exhaustive.success_rate(),
        stats.exhaustive.attempts,
    );
}
