//! Error types for selector configuration and I/O

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("pT bin edges not strictly increasing at index {index}: {previous} >= {current}")]
    NonIncreasingEdges {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("Bin count mismatch: {edges} edges require {expected} rows, got {got}")]
    BinCountMismatch {
        edges: usize,
        expected: usize,
        got: usize,
    },

    #[error("Missing cut \"{label}\" for pT bin {bin}")]
    MissingCut { bin: usize, label: String },

    #[error("Invalid selector parameter: {0}")]
    InvalidParameter(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    Io(String),
}
