//! Error types for analysis runs

use covenant_extractor::ExtractorError;
use covenant_verifier::VerifierError;
use thiserror::Error;

/// Errors that abort an analysis run
///
/// Per-candidate failures (timeouts, rejected responses) are never errors;
/// they show up in [`crate::AnalysisMetrics`].
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// Clause extraction failed
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker error (tokio runtime issues)
    #[error("Worker error: {0}")]
    Worker(String),
}

impl From<ExtractorError> for AnalyzerError {
    fn from(e: ExtractorError) -> Self {
        match e {
            ExtractorError::Config(msg) => AnalyzerError::Config(msg),
            other => AnalyzerError::Extraction(other.to_string()),
        }
    }
}

impl From<VerifierError> for AnalyzerError {
    fn from(e: VerifierError) -> Self {
        AnalyzerError::Config(e.to_string())
    }
}
