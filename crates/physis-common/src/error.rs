//! Error types for the Physis harness
//!
//! Only malformed input is an error here. Empty plans, duplicate rules and
//! exhausted search budgets are ordinary results and never surface as
//! `PhysisError`.

use thiserror::Error;

use crate::types::goal::TaskId;

/// Result type alias using PhysisError
pub type Result<T> = std::result::Result<T, PhysisError>;

/// Unified error type for Physis operations
#[derive(Debug, Error)]
pub enum PhysisError {
    /// Action symbol outside the fixed action set
    #[error("Unknown action: {0}")]
    InvalidAction(String),

    /// Discrete phase outside {0, 1, 2}
    #[error("Invalid phase: {0} (expected 0, 1 or 2)")]
    InvalidPhase(i64),

    #[error("Unknown task: {0}")]
    UnknownTask(TaskId),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for PhysisError {
    fn from(err: serde_json::Error) -> Self {
        PhysisError::Serialization(err.to_string())
    }
}
