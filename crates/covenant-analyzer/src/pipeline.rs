//! End-to-end pipeline: text in, verified conflicts out

use crate::{AnalysisReport, AnalyzerError, ConflictAnalyzer, PipelineConfig};
use covenant_domain::traits::AnalysisStore;
use covenant_domain::RunId;
use covenant_extractor::{CandidateReport, ClauseExtractor, Extraction};
use covenant_oracle::ClassificationOracle;
use covenant_verifier::Verifier;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Everything one pipeline run produced
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Identifier of the run
    pub run_id: RunId,

    /// Clause tree and extraction events
    pub extraction: Extraction,

    /// Candidate pairs and truncated buckets
    pub candidates: CandidateReport,

    /// Accepted conflicts and metrics
    pub report: AnalysisReport,
}

/// Extraction, candidate selection and conflict analysis wired together
pub struct Pipeline<O> {
    extractor: ClauseExtractor,
    analyzer: ConflictAnalyzer<O>,
}

impl<O: ClassificationOracle + 'static> Pipeline<O> {
    /// Build every stage from one configuration
    pub fn new(config: PipelineConfig, oracle: O) -> Result<Self, AnalyzerError> {
        config.validate().map_err(AnalyzerError::Config)?;
        let extractor = ClauseExtractor::new(config.extractor)?;
        let verifier = Verifier::new(config.verifier)?;
        let analyzer = ConflictAnalyzer::new(oracle, verifier, config.analyzer)?;
        Ok(Self {
            extractor,
            analyzer,
        })
    }

    /// The extraction stage
    pub fn extractor(&self) -> &ClauseExtractor {
        &self.extractor
    }

    /// The analysis stage
    pub fn analyzer(&self) -> &ConflictAnalyzer<O> {
        &self.analyzer
    }

    /// Run the whole pipeline over normalized document text
    ///
    /// Only empty input is an error. A cancelled run still returns every
    /// conflict accepted before cancellation.
    pub async fn run(
        &self,
        run_id: RunId,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<PipelineOutput, AnalyzerError> {
        let extraction = self.extractor.extract(text)?;
        let candidates = self.extractor.select_candidates(&extraction.tree);

        let mut report = self
            .analyzer
            .analyze(&extraction.tree, &candidates.candidates, cancel)
            .await;
        report.metrics.truncated_buckets = candidates.truncations.len();

        info!(
            "Run {}: {} clauses, {} candidates, {} conflicts",
            run_id,
            extraction.tree.len(),
            candidates.candidates.len(),
            report.conflicts.len()
        );

        Ok(PipelineOutput {
            run_id,
            extraction,
            candidates,
            report,
        })
    }
}

/// Hand a run's clauses and conflicts to the persistence store
pub fn persist<S>(store: &mut S, output: &PipelineOutput) -> Result<(), AnalyzerError>
where
    S: AnalysisStore,
    S::Error: std::fmt::Display,
{
    store
        .save_run(
            output.run_id,
            output.extraction.tree.clauses(),
            &output.report.conflicts,
        )
        .map_err(|e| AnalyzerError::Store(format!("Failed to save run {}: {}", output.run_id, e)))
}
