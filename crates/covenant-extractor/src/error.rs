//! Error types for the Extractor

use thiserror::Error;

/// Errors that can occur during extraction
///
/// Structural oddities (missing boundaries, numbering gaps) are not errors;
/// they degrade gracefully and surface as [`crate::ExtractionEvent`]s.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Input text is empty or whitespace-only
    #[error("Document text is empty")]
    EmptyDocument,

    /// A configured pattern or keyword table failed to compile
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The built tree violated a structural invariant
    #[error("Structure error: {0}")]
    Structure(String),
}

impl From<regex::Error> for ExtractorError {
    fn from(e: regex::Error) -> Self {
        ExtractorError::InvalidPattern(e.to_string())
    }
}

impl From<aho_corasick::BuildError> for ExtractorError {
    fn from(e: aho_corasick::BuildError) -> Self {
        ExtractorError::InvalidPattern(e.to_string())
    }
}
