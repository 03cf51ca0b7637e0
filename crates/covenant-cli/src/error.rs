//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Extraction error
    #[error("Extraction error: {0}")]
    Extraction(#[from] covenant_extractor::ExtractorError),

    /// Analysis error
    #[error("Analysis error: {0}")]
    Analyzer(#[from] covenant_analyzer::AnalyzerError),

    /// Oracle setup error
    #[error("Oracle error: {0}")]
    Oracle(#[from] covenant_oracle::OracleError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] covenant_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
