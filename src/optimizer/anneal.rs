use super::neighbors::{apply_chain, intelligent_pair, multi_swap_chain, IntelligentParams};
use super::{Strategy, StrategyKind};
use crate::config::AnnealParams;
use crate::cube::CubeState;
use crate::error::McResult;
use crate::recorder::{RunRecord, RunRecorder, Termination};
use crate::scorer::{CostModel, Objective, ScoredCube};
use fastrand::Rng;
use tracing::{debug, info};

// exp() underflows to zero below this
const MIN_EXPONENT: f64 = -745.0;

/// Metropolis acceptance with cost-normalized, capped deltas.
///
/// Improvements and sideways moves are always accepted. A worsening delta
/// is divided by the current cost (at least 1), capped at `delta_cap`, and
/// scaled by the relative temperature `t / t0`.
pub fn acceptance_probability(
    delta: f64,
    current: f64,
    temperature: f64,
    initial_temperature: f64,
    delta_cap: f64,
) -> f64 {
    if delta <= 0.0 {
        return 1.0;
    }
    if temperature <= 0.0 {
        return 0.0;
    }
    let normalized = (delta / current.abs().max(1.0)).min(delta_cap);
    let exponent = (-normalized / (temperature / initial_temperature)).clamp(MIN_EXPONENT, 0.0);
    exponent.exp()
}

enum Proposal {
    Swap(usize, usize),
    Chain(ScoredCube, usize, usize),
}

/// Simulated annealing with staged cooling, reheating and two move types.
pub struct SimulatedAnnealing {
    params: AnnealParams,
    cooling: [f64; 3],
}

impl SimulatedAnnealing {
    pub fn new(params: AnnealParams) -> McResult<Self> {
        let cooling = params.get_cooling_rates()?;
        Ok(Self { params, cooling })
    }

    /// Early, middle and late thirds of the stage count use their own rate.
    fn cooling_rate(&self, iteration: usize) -> f64 {
        let p = &self.params;
        let stages = p.max_iterations / p.stage_iterations.max(1);
        let stage = iteration / p.stage_iterations.max(1);
        if stage < stages / 3 {
            self.cooling[0]
        } else if stage < stages * 2 / 3 {
            self.cooling[1]
        } else {
            self.cooling[2]
        }
    }
}

impl Strategy for SimulatedAnnealing {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SimulatedAnnealing
    }

    fn objective(&self) -> Objective {
        self.params.objective
    }

    fn run(&self, model: &CostModel, start: CubeState, rng: &mut Rng) -> McResult<RunRecord> {
        model.check_cube(&start)?;
        let p = &self.params;
        let objective = p.objective;
        let size = start.size();
        let targeting = IntelligentParams {
            bias: p.intelligent_bias,
            hot_line_fraction: p.hot_line_fraction,
            match_fraction: p.match_fraction,
        };

        let mut scored = ScoredCube::new(model, start);
        let mut current = scored.cost(model, objective);
        let mut best_cost = current;
        let mut best_cube = scored.cube().clone();
        let mut recorder = RunRecorder::start(self.kind(), objective, size, current);

        let mut temperature = p.initial_temperature;
        let mut non_improving = 0usize;
        let mut iteration = 0;

        info!(
            "Annealing: start cost {:.2}, T0 {}, cooling {:?}",
            current, temperature, self.cooling
        );

        let termination = loop {
            if scored.is_solved() {
                break Termination::Solved;
            }
            if iteration >= p.max_iterations {
                break Termination::BudgetExhausted;
            }
            if temperature < p.min_temperature {
                break Termination::TemperatureFloor;
            }

            // 1. Propose
            let (proposal, cost) = if rng.f64() < p.multi_swap_probability {
                let chain = multi_swap_chain(size, rng);
                let mut next = scored.clone();
                apply_chain(model, &mut next, &chain);
                let cost = next.cost(model, objective);
                let first = chain.first().copied().unwrap_or(0);
                let last = chain.last().copied().unwrap_or(0);
                (Proposal::Chain(next, first, last), cost)
            } else {
                let Some((a, b)) = intelligent_pair(model, &scored, rng, &targeting) else {
                    break Termination::LocalOptimum;
                };
                (Proposal::Swap(a, b), scored.swap_cost(model, a, b, objective))
            };

            // 2. Accept or reject
            let delta = cost - current;
            let prob =
                acceptance_probability(delta, current, temperature, p.initial_temperature, p.delta_cap);
            let accepted = delta <= 0.0 || rng.f64() < prob;

            if accepted {
                let (first, second) = match proposal {
                    Proposal::Swap(a, b) => {
                        scored.apply_swap(model, a, b);
                        (a, b)
                    }
                    Proposal::Chain(next, first, last) => {
                        scored = next;
                        (first, last)
                    }
                };
                recorder.record_accepted(iteration, first, second, cost, prob);
                current = cost;
            }

            // 3. Progress bookkeeping
            if accepted && delta < 0.0 {
                non_improving = 0;
                if current < best_cost {
                    best_cost = current;
                    best_cube = scored.cube().clone();
                    debug!("iter {}: new best {:.2} at T={:.4}", iteration, best_cost, temperature);
                }
            } else {
                non_improving += 1;
                if p.stuck_window > 0 && non_improving % p.stuck_window == 0 {
                    recorder.mark_stuck();
                }
            }

            // 4. Temperature
            if non_improving > p.reheat_after {
                temperature = p.initial_temperature * p.reheat_factor;
                non_improving = 0;
                info!("iter {}: reheating to {:.2}", iteration, temperature);
            } else {
                temperature *= self.cooling_rate(iteration);
            }

            iteration += 1;
            recorder.record_cost(current);
        };

        info!(
            "Annealing: {} after {} iterations (T={:.4}, stuck {}), best {:.2}",
            termination,
            iteration,
            temperature,
            recorder.stuck_count(),
            best_cost
        );
        Ok(recorder.finish(model, best_cube, best_cost, iteration, termination))
    }
}
