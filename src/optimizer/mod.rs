pub mod anneal;
pub mod crossover;
pub mod genetic;
pub mod mutation;
pub mod neighbors;
pub mod restart;
pub mod runner;
pub mod sideways;
pub mod steepest;
pub mod stochastic;

use crate::config::Config;
use crate::cube::CubeState;
use crate::error::McResult;
use crate::recorder::RunRecord;
use crate::scorer::{CostModel, Objective};
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

pub use self::anneal::SimulatedAnnealing;
pub use self::genetic::GeneticAlgorithm;
pub use self::restart::RandomRestart;
pub use self::sideways::SidewaysMove;
pub use self::steepest::SteepestAscent;
pub use self::stochastic::StochasticHillClimb;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    SteepestAscent,
    SidewaysMove,
    RandomRestart,
    Stochastic,
    SimulatedAnnealing,
    Genetic,
}

/// A local-search strategy: consumes a start cube, returns the run record.
///
/// Strategies own no mutable state between runs, so one instance can be
/// shared by parallel trials. All randomness comes from `rng`.
pub trait Strategy: Send + Sync {
    fn kind(&self) -> StrategyKind;
    fn objective(&self) -> Objective;
    fn run(&self, model: &CostModel, start: CubeState, rng: &mut Rng) -> McResult<RunRecord>;
}

/// Validates `config` and builds the strategy for `kind`.
pub fn build(kind: StrategyKind, config: &Config) -> McResult<Box<dyn Strategy>> {
    config.validate()?;
    let strategy: Box<dyn Strategy> = match kind {
        StrategyKind::SteepestAscent => Box::new(SteepestAscent::new(config.hill.clone())),
        StrategyKind::SidewaysMove => Box::new(SidewaysMove::new(config.sideways.clone())),
        StrategyKind::RandomRestart => Box::new(RandomRestart::new(config.restart.clone())),
        StrategyKind::Stochastic => {
            Box::new(StochasticHillClimb::new(config.stochastic.clone()))
        }
        StrategyKind::SimulatedAnnealing => {
            Box::new(SimulatedAnnealing::new(config.anneal.clone())?)
        }
        StrategyKind::Genetic => Box::new(GeneticAlgorithm::new(config.genetic.clone())),
    };
    Ok(strategy)
}
