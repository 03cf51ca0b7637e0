//! Ollama Oracle Implementation
//!
//! Classifies clause pairs with a local model served by Ollama.
//!
//! # Features
//!
//! - Async HTTP communication with the Ollama generate API
//! - JSON output mode with lenient parsing
//! - Configurable endpoint, model and sampling temperature
//!
//! A single call makes a single HTTP request. Deadlines and retries are added
//! by wrapping the oracle in a [`crate::ResilientOracle`].
//!
//! # Examples
//!
//! ```no_run
//! use covenant_oracle::OllamaOracle;
//!
//! let oracle = OllamaOracle::new("http://localhost:11434", "llama3.1").unwrap();
//! ```

use crate::error::OracleError;
use crate::parser::parse_oracle_response;
use crate::prompt::PromptBuilder;
use crate::types::{OracleRequest, OracleResponse};
use crate::ClassificationOracle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default sampling temperature
///
/// Kept above zero so repeated votes on the same pair are independent samples.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Ollama-backed classification oracle
pub struct OllamaOracle {
    endpoint: String,
    model: String,
    temperature: f32,
    client: reqwest::Client,
}

/// Request body for Ollama generate API
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    format: &'a str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
}

/// Response from Ollama generate API
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaOracle {
    /// Create a new Ollama oracle
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1", "mistral")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| OracleError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: DEFAULT_TEMPERATURE,
            client,
        })
    }

    /// Create a new Ollama oracle on the default endpoint
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, OracleError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Model name
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ClassificationOracle for OllamaOracle {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn classify(&self, request: &OracleRequest) -> Result<OracleResponse, OracleError> {
        let url = format!("{}/api/generate", self.endpoint);
        let prompt = PromptBuilder::new(request).build();
        debug!("Prompt length: {} chars", prompt.len());

        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: self.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OracleError::Transport(format!("Request failed: {}", e)))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(OracleError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(OracleError::Transport(format!("HTTP {}: {}", status, error_text)));
        }

        let generated = response
            .json::<OllamaGenerateResponse>()
            .await
            .map_err(|e| OracleError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        debug!("Oracle response length: {} chars", generated.response.len());
        parse_oracle_response(&generated.response)
    }
}
