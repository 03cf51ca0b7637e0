//! Verifier error types

use thiserror::Error;

/// Errors that can occur while building a verifier
///
/// Verification itself never fails: a bad oracle answer is a
/// [`crate::RejectionReason`], not an error.
#[derive(Error, Debug)]
pub enum VerifierError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A sanity pattern failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

impl From<regex::Error> for VerifierError {
    fn from(e: regex::Error) -> Self {
        VerifierError::InvalidPattern(e.to_string())
    }
}
