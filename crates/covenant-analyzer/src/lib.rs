//! Covenant Analyzer
//!
//! Turns candidate clause pairs into verified conflicts by fanning oracle
//! calls out over a bounded worker pool.
//!
//! # Overview
//!
//! The Analyzer is responsible for:
//! - **Screening**: one oracle call per candidate, verified against the text
//! - **Consistency voting**: fresh votes for survivors, strict majority wins
//! - **Resource bounds**: a fixed number of calls in flight, per-call
//!   deadlines and transport retries
//! - **Cancellation**: no new calls after cancel, partial results kept
//! - **Metrics**: every dropped candidate is counted by reason
//!
//! # Architecture
//!
//! ```text
//! Candidates → Screening ─┬─ Single ─────────────────────┬→ Conflicts
//!                         └─ SelfConsistent → N votes ───┘
//! ```
//!
//! Both phases share one [`OraclePool`]. Results are joined per phase and
//! assembled in candidate order by a single writer.
//!
//! # Usage
//!
//! ```no_run
//! use covenant_analyzer::{persist, Pipeline, PipelineConfig};
//! use covenant_domain::RunId;
//! use covenant_oracle::OllamaOracle;
//! use covenant_store::SqliteStore;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let oracle = OllamaOracle::default_endpoint("llama3.1")?;
//!     let pipeline = Pipeline::new(PipelineConfig::default(), oracle)?;
//!
//!     let text = std::fs::read_to_string("contract.txt")?;
//!     let output = pipeline.run(RunId::new(), &text, &CancellationToken::new()).await?;
//!     println!("{}", output.report.metrics.summary());
//!
//!     let mut store = SqliteStore::new("covenant.db")?;
//!     persist(&mut store, &output)?;
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [analyzer]
//! strategy = "self_consistent"
//! votes = 2
//! max_concurrency = 8
//! timeout_secs = 60
//!
//! [analyzer.retry]
//! max_attempts = 3
//! initial_backoff_ms = 1000
//! multiplier = 2
//! max_backoff_ms = 30000
//! ```

#![warn(missing_docs)]

mod analyzer;
mod config;
mod consensus;
mod error;
mod metrics;
mod pipeline;
mod pool;

pub use analyzer::{AnalysisReport, ConflictAnalyzer};
pub use config::{AnalyzerConfig, PipelineConfig, Strategy};
pub use consensus::{required_votes, VoteTally};
pub use error::AnalyzerError;
pub use metrics::AnalysisMetrics;
pub use pipeline::{persist, Pipeline, PipelineOutput};
pub use pool::{CallOutcome, OraclePool};
