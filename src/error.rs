use thiserror::Error;

#[derive(Error, Debug)]
pub enum MagicCubeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid cube size: {0} (must be at least 1)")]
    InvalidSize(usize),

    #[error("Grid length mismatch: expected {expected} values, got {actual}")]
    GridLength { expected: usize, actual: usize },

    #[error("Grid shape error: {0}")]
    Shape(String),

    #[error("Grid is not a permutation of 1..=N^3: {0}")]
    NotPermutation(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Duplicate repair stalled with {duplicates} duplicate cells and no unused values left")]
    RepairExhausted { duplicates: usize },
}

pub type McResult<T> = Result<T, MagicCubeError>;
