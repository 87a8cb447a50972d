use super::steepest::climb;
use super::{Strategy, StrategyKind};
use crate::config::RestartParams;
use crate::cube::CubeState;
use crate::error::McResult;
use crate::recorder::{RunRecord, RunRecorder, Termination};
use crate::scorer::{CostModel, Objective, ScoredCube};
use fastrand::Rng;
use tracing::{debug, info};

struct Leg {
    scored: ScoredCube,
    recorder: RunRecorder,
    cost: f64,
    iterations: usize,
    termination: Termination,
}

/// Steepest ascent from fresh random grids, keeping the best climb.
pub struct RandomRestart {
    params: RestartParams,
}

impl RandomRestart {
    pub fn new(params: RestartParams) -> Self {
        Self { params }
    }

    fn climb_leg(
        &self,
        model: &CostModel,
        cube: CubeState,
        outer: &RunRecorder,
        restart: usize,
    ) -> Leg {
        let objective = self.params.objective;
        let mut scored = ScoredCube::new(model, cube);
        let mut recorder = outer.fork(scored.cost(model, objective));
        let (iterations, termination) = climb(
            model,
            &mut scored,
            self.params.max_iterations_per_restart,
            objective,
            &mut recorder,
        );
        let cost = scored.cost(model, objective);
        debug!(
            "Restart {}: {} after {} moves, cost {:.2}",
            restart, termination, iterations, cost
        );
        Leg {
            scored,
            recorder,
            cost,
            iterations,
            termination,
        }
    }
}

impl Strategy for RandomRestart {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RandomRestart
    }

    fn objective(&self) -> Objective {
        self.params.objective
    }

    fn run(&self, model: &CostModel, start: CubeState, rng: &mut Rng) -> McResult<RunRecord> {
        model.check_cube(&start)?;
        let p = &self.params;
        let objective = p.objective;
        let mut cube = start;
        let initial = model.cost(&cube, objective);
        let outer = RunRecorder::start(self.kind(), objective, model.size(), initial);

        // Restart 0 climbs from the supplied grid
        let mut best = self.climb_leg(model, cube.clone(), &outer, 0);
        let mut iterations_per_restart = vec![best.iterations];

        for restart in 1..p.max_restarts {
            if best.scored.is_solved() {
                break;
            }
            cube.reshuffle(rng);
            let leg = self.climb_leg(model, cube.clone(), &outer, restart);
            iterations_per_restart.push(leg.iterations);
            if leg.cost < best.cost {
                info!("Restart {}: new best cost {:.2}", restart, leg.cost);
                best = leg;
            }
        }

        // Unsolved means every restart was spent
        let termination = if best.scored.is_solved() {
            Termination::Solved
        } else {
            Termination::BudgetExhausted
        };
        debug!("Best restart stopped with {}", best.termination);
        let mut recorder = best.recorder;
        recorder.set_restarts(iterations_per_restart);
        Ok(recorder.finish(
            model,
            best.scored.into_cube(),
            best.cost,
            best.iterations,
            termination,
        ))
    }
}
