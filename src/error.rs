//! Error types for the colony simulator.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type ColonyResult<T> = Result<T, ColonyError>;

/// Everything that can go wrong while loading a network or running a colony.
#[derive(Debug, Error)]
pub enum ColonyError {
    /// Rejected before the engine runs (bad dimension, start index, distances, config).
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Every unvisited station carries zero combined weight from `from`.
    #[error("no feasible successor from station {from} (visited: {visited:?})")]
    NoFeasibleSuccessor { from: usize, visited: Vec<usize> },

    /// The route has zero length, so no finite deposit exists.
    #[error("route {route:?} has zero total distance; deposit skipped")]
    ZeroTotalDistance { route: Vec<usize> },

    /// Malformed instance file.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl ColonyError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        ColonyError::InvalidInput { reason: reason.into() }
    }
}
