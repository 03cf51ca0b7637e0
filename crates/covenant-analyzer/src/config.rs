//! Configuration for analysis runs
//!
//! Defines the voting strategy, oracle concurrency, deadlines and retries,
//! and the pipeline-wide configuration that nests every stage.

use covenant_extractor::ExtractorConfig;
use covenant_oracle::RetryPolicy;
use covenant_verifier::VerifierConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How many oracle votes a candidate needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// The screening call is the only vote
    Single,

    /// Survivors of screening get `votes` fresh, independent votes
    SelfConsistent,
}

impl Strategy {
    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Single => "single",
            Strategy::SelfConsistent => "self_consistent",
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "single" => Ok(Strategy::Single),
            "self_consistent" => Ok(Strategy::SelfConsistent),
            other => Err(format!("Invalid strategy: {}", other)),
        }
    }
}

/// Configuration for the oracle fan-out
///
/// # Examples
///
/// ```
/// use covenant_analyzer::{AnalyzerConfig, Strategy};
///
/// let config = AnalyzerConfig::default();
/// assert_eq!(config.strategy, Strategy::SelfConsistent);
/// assert_eq!(config.votes, 2);
/// assert_eq!(config.votes_per_candidate(), 2);
///
/// let config = AnalyzerConfig::aggressive();
/// assert_eq!(config.votes_per_candidate(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Voting strategy
    pub strategy: Strategy,

    /// Consistency votes per surviving candidate (self-consistent only)
    /// Default: 2
    pub votes: usize,

    /// Maximum oracle calls in flight at once
    /// Default: 8
    pub max_concurrency: usize,

    /// Deadline for a single oracle attempt, in seconds
    /// Default: 60
    pub timeout_secs: u64,

    /// Transport-level retry policy
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::SelfConsistent,
            votes: 2,
            max_concurrency: 8,
            timeout_secs: 60,
            retry: RetryPolicy::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Aggressive configuration (single vote, wide fan-out, short deadline)
    ///
    /// Suitable for quick screening of large documents.
    pub fn aggressive() -> Self {
        Self {
            strategy: Strategy::Single,
            votes: 1,
            max_concurrency: 40,
            timeout_secs: 30,
            retry: RetryPolicy::default(),
        }
    }

    /// Lenient configuration (more votes, narrow fan-out, long deadline)
    ///
    /// Suitable for slow local models or thorough review.
    pub fn lenient() -> Self {
        Self {
            strategy: Strategy::SelfConsistent,
            votes: 3,
            max_concurrency: 2,
            timeout_secs: 180,
            retry: RetryPolicy::default(),
        }
    }

    /// Number of votes that decide a candidate
    pub fn votes_per_candidate(&self) -> usize {
        match self.strategy {
            Strategy::Single => 1,
            Strategy::SelfConsistent => self.votes,
        }
    }

    /// Get the per-attempt deadline as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.strategy == Strategy::SelfConsistent && self.votes == 0 {
            return Err("votes must be at least 1 for self_consistent".to_string());
        }
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be at least 1".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        self.retry.validate()
    }
}

/// Configuration for a complete pipeline run
///
/// Loaded from TOML with one table per stage:
///
/// ```toml
/// [extractor]
/// topic_bucket_cap = 40
///
/// [verifier]
/// confidence_threshold = 0.85
///
/// [analyzer]
/// strategy = "self_consistent"
/// votes = 2
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Extraction and candidate selection
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Verification gates
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Oracle fan-out and voting
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
}

impl PipelineConfig {
    /// Aggressive preset across every stage
    pub fn aggressive() -> Self {
        Self {
            extractor: ExtractorConfig::aggressive(),
            verifier: VerifierConfig::strict(),
            analyzer: AnalyzerConfig::aggressive(),
        }
    }

    /// Lenient preset across every stage
    pub fn lenient() -> Self {
        Self {
            extractor: ExtractorConfig::lenient(),
            verifier: VerifierConfig::permissive(),
            analyzer: AnalyzerConfig::lenient(),
        }
    }

    /// Validate every section
    pub fn validate(&self) -> Result<(), String> {
        self.extractor
            .validate()
            .map_err(|e| format!("extractor: {}", e))?;
        self.verifier
            .validate()
            .map_err(|e| format!("verifier: {}", e))?;
        self.analyzer
            .validate()
            .map_err(|e| format!("analyzer: {}", e))
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}
