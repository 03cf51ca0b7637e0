//! Error types for oracle calls

use thiserror::Error;

/// Errors that can occur during a classification call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// The call did not complete within its deadline
    #[error("Oracle call timed out after {0} ms")]
    Timeout(u64),

    /// Network or API communication error
    #[error("Transport error: {0}")]
    Transport(String),

    /// The oracle answered with something that is not a classification
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// The call was abandoned because the run was cancelled
    #[error("Oracle call cancelled")]
    Cancelled,
}

impl OracleError {
    /// Whether a transport-level retry may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, OracleError::Timeout(_) | OracleError::Transport(_))
    }

    /// Short label used in metrics
    pub fn kind(&self) -> &'static str {
        match self {
            OracleError::Timeout(_) => "timeout",
            OracleError::Transport(_) => "transport",
            OracleError::InvalidResponse(_) => "invalid_response",
            OracleError::ModelNotAvailable(_) => "model_not_available",
            OracleError::Cancelled => "cancelled",
        }
    }
}
