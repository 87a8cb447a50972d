pub mod config;
pub mod cube;
pub mod error;
pub mod optimizer;
pub mod recorder;
pub mod scorer;
// cmd and reports are binary modules (see main.rs).

pub use cube::{Coord, CubeState};
pub use error::{MagicCubeError, McResult};
pub use optimizer::{Strategy, StrategyKind};
pub use recorder::{RunRecord, Termination};
pub use scorer::{CostModel, Objective};
