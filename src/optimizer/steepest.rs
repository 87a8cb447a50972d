use super::neighbors::best_swap;
use super::{Strategy, StrategyKind};
use crate::config::HillClimbParams;
use crate::cube::CubeState;
use crate::error::McResult;
use crate::recorder::{RunRecord, RunRecorder, Termination};
use crate::scorer::{CostModel, Objective, ScoredCube};
use fastrand::Rng;
use tracing::{debug, info};

/// Always takes the single best strictly-improving swap.
pub struct SteepestAscent {
    params: HillClimbParams,
}

impl SteepestAscent {
    pub fn new(params: HillClimbParams) -> Self {
        Self { params }
    }
}

impl Strategy for SteepestAscent {
    fn kind(&self) -> StrategyKind {
        StrategyKind::SteepestAscent
    }

    fn objective(&self) -> Objective {
        self.params.objective
    }

    fn run(&self, model: &CostModel, start: CubeState, _rng: &mut Rng) -> McResult<RunRecord> {
        model.check_cube(&start)?;
        let objective = self.params.objective;
        let mut scored = ScoredCube::new(model, start);
        let initial = scored.cost(model, objective);
        let mut recorder = RunRecorder::start(self.kind(), objective, model.size(), initial);

        info!("Steepest ascent: start cost {:.2}", initial);
        let (iterations, termination) = climb(
            model,
            &mut scored,
            self.params.max_iterations,
            objective,
            &mut recorder,
        );
        let final_cost = scored.cost(model, objective);
        info!(
            "Steepest ascent: {} after {} moves, cost {:.2}",
            termination, iterations, final_cost
        );

        Ok(recorder.finish(model, scored.into_cube(), final_cost, iterations, termination))
    }
}

/// Runs steepest ascent on `scored` in place and returns the number of
/// accepted moves with the reason it stopped.
pub(crate) fn climb(
    model: &CostModel,
    scored: &mut ScoredCube,
    max_iterations: usize,
    objective: Objective,
    recorder: &mut RunRecorder,
) -> (usize, Termination) {
    let mut current = scored.cost(model, objective);
    let mut iterations = 0;
    loop {
        if scored.is_solved() {
            return (iterations, Termination::Solved);
        }
        if iterations >= max_iterations {
            return (iterations, Termination::BudgetExhausted);
        }
        match best_swap(model, scored, objective) {
            Some((a, b, cost)) if cost < current => {
                scored.apply_swap(model, a, b);
                recorder.record_move(iterations, a, b, cost);
                recorder.record_cost(cost);
                debug!("iter {}: swap {} <-> {}, cost {:.2}", iterations, a, b, cost);
                current = cost;
                iterations += 1;
            }
            _ => return (iterations, Termination::LocalOptimum),
        }
    }
}
