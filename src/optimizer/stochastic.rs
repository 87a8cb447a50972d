use super::neighbors::random_pair;
use super::{Strategy, StrategyKind};
use crate::config::StochasticParams;
use crate::cube::CubeState;
use crate::error::McResult;
use crate::recorder::{RunRecord, RunRecorder, Termination};
use crate::scorer::{CostModel, Objective, ScoredCube};
use fastrand::Rng;
use tracing::{debug, info};

/// One random neighbor per iteration, accepted only when strictly better.
pub struct StochasticHillClimb {
    params: StochasticParams,
}

impl StochasticHillClimb {
    pub fn new(params: StochasticParams) -> Self {
        Self { params }
    }
}

impl Strategy for StochasticHillClimb {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Stochastic
    }

    fn objective(&self) -> Objective {
        self.params.objective
    }

    fn run(&self, model: &CostModel, start: CubeState, rng: &mut Rng) -> McResult<RunRecord> {
        model.check_cube(&start)?;
        let objective = self.params.objective;
        let len = start.len();
        let mut scored = ScoredCube::new(model, start);
        let mut current = scored.cost(model, objective);
        let mut recorder = RunRecorder::start(self.kind(), objective, model.size(), current);
        info!("Stochastic: start cost {:.2}", current);

        let mut iterations = 0;
        let termination = loop {
            if scored.is_solved() {
                break Termination::Solved;
            }
            if iterations >= self.params.max_iterations {
                break Termination::BudgetExhausted;
            }
            let Some((a, b)) = random_pair(rng, len) else {
                break Termination::LocalOptimum;
            };
            let cost = scored.swap_cost(model, a, b, objective);
            if cost < current {
                scored.apply_swap(model, a, b);
                recorder.record_move(iterations, a, b, cost);
                debug!("iter {}: swap {} <-> {}, cost {:.2}", iterations, a, b, cost);
                current = cost;
            }
            iterations += 1;
            recorder.record_cost(current);
        };

        info!(
            "Stochastic: {} after {} iterations, cost {:.2}",
            termination, iterations, current
        );
        Ok(recorder.finish(model, scored.into_cube(), current, iterations, termination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_improvements_are_accepted() {
        let model = CostModel::standard(3).unwrap();
        let mut rng = Rng::with_seed(13);
        let start = CubeState::random(3, &mut rng).unwrap();
        let strategy = StochasticHillClimb::new(StochasticParams {
            max_iterations: 500,
            objective: Objective::Weighted,
        });
        let record = strategy.run(&model, start, &mut rng).unwrap();

        assert_eq!(record.cost_history.len(), record.iterations + 1);
        for pair in record.moves.windows(2) {
            assert!(pair[1].cost < pair[0].cost);
        }
        assert!(record.final_cost <= record.initial_cost);
    }

    #[test]
    fn test_same_seed_same_run() {
        let model = CostModel::standard(3).unwrap();
        let start = CubeState::random(3, &mut Rng::with_seed(99)).unwrap();
        let strategy = StochasticHillClimb::new(StochasticParams::default());
        let a = strategy
            .run(&model, start.clone(), &mut Rng::with_seed(3))
            .unwrap();
        let b = strategy.run(&model, start, &mut Rng::with_seed(3)).unwrap();
        assert_eq!(a.final_cube, b.final_cube);
        assert_eq!(a.moves, b.moves);
    }
}
