//! Covenant Oracle
//!
//! The single seam between the pipeline and the model that judges whether two
//! clauses conflict.
//!
//! # Architecture
//!
//! ```text
//! OracleRequest → PromptBuilder → model → parse_oracle_response → OracleResponse
//! ```
//!
//! Implementations:
//! - [`OllamaOracle`]: local model over HTTP
//! - [`MockOracle`]: scripted replies for tests
//! - [`ResilientOracle`]: deadline and retry wrapper around either
//!
//! An [`OracleResponse`] is untrusted. Nothing in this crate decides whether a
//! claimed conflict is real; that is the verifier's job.

#![warn(missing_docs)]

mod error;
mod mock;
mod ollama;
mod parser;
mod prompt;
mod resilient;
mod retry;
mod types;

use async_trait::async_trait;
use std::sync::Arc;

pub use error::OracleError;
pub use mock::MockOracle;
pub use ollama::{OllamaOracle, DEFAULT_ENDPOINT, DEFAULT_TEMPERATURE};
pub use parser::parse_oracle_response;
pub use prompt::PromptBuilder;
pub use resilient::ResilientOracle;
pub use retry::RetryPolicy;
pub use types::{OracleRequest, OracleResponse};

/// Trait for conflict classification backends
///
/// Implementations must be safe to call concurrently; the analyzer fans
/// requests out across a worker pool.
#[async_trait]
pub trait ClassificationOracle: Send + Sync {
    /// Backend name used in logs
    fn name(&self) -> &str;

    /// Classify one clause pair
    async fn classify(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError>;
}

#[async_trait]
impl<T: ClassificationOracle + ?Sized> ClassificationOracle for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn classify(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError> {
        (**self).classify(request).await
    }
}

#[async_trait]
impl<T: ClassificationOracle + ?Sized> ClassificationOracle for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn classify(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError> {
        (**self).classify(request).await
    }
}
