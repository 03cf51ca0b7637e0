//! Main extraction logic

use crate::candidates::CandidateReport;
use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::hierarchy::HierarchyBuilder;
use crate::inheritance::inherit;
use crate::namespace::resolve;
use crate::rules::RuleSet;
use crate::scanner::{dedupe, BoundaryRules, RegexBoundaryRules};
use crate::types::Extraction;
use covenant_domain::ClauseTree;
use tracing::{debug, info};

/// Clause extractor: text → clause tree → candidate pairs
///
/// Every stage is pure and synchronous. One extractor can serve any number of
/// documents, concurrently if shared by reference.
pub struct ClauseExtractor {
    boundaries: Box<dyn BoundaryRules + Send + Sync>,
    rules: RuleSet,
}

impl ClauseExtractor {
    /// Create an extractor with the default regex boundary rules
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        let boundaries = RegexBoundaryRules::new(&config)?;
        Ok(Self {
            boundaries: Box::new(boundaries),
            rules: RuleSet::new(config)?,
        })
    }

    /// Create an extractor with the default configuration
    pub fn default_config() -> Result<Self, ExtractorError> {
        Self::new(ExtractorConfig::default())
    }

    /// Replace the boundary-detection rules
    pub fn with_boundary_rules<R>(mut self, rules: R) -> Self
    where
        R: BoundaryRules + Send + Sync + 'static,
    {
        self.boundaries = Box::new(rules);
        self
    }

    /// Compiled rule set
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Build the clause tree for one document
    ///
    /// Fails only on empty or whitespace-only text. Structural oddities are
    /// reported as events on the returned [`Extraction`].
    pub fn extract(&self, text: &str) -> Result<Extraction, ExtractorError> {
        if text.trim().is_empty() {
            return Err(ExtractorError::EmptyDocument);
        }

        let config = self.rules.config();
        let markers = dedupe(self.boundaries.scan(text), text, config.cluster_window);
        debug!("Found {} boundary markers", markers.len());

        let resolved = resolve(&markers, text.len());
        let (mut clauses, events) =
            HierarchyBuilder::new(text, config.gap_search_window, config.heading_attach_window)
                .build(&resolved);

        inherit(&mut clauses, self.rules.categories());
        self.rules.detector().apply(&mut clauses);
        for clause in clauses.iter_mut() {
            clause.topics = self.rules.topics().tag(clause.body());
        }

        let tree = ClauseTree::from_clauses(clauses).map_err(ExtractorError::Structure)?;

        info!(
            clauses = tree.len(),
            roots = tree.roots().count(),
            stubs = tree.iter().filter(|c| c.is_stub).count(),
            toc = tree.iter().filter(|c| c.is_toc).count(),
            overrides = tree.iter().filter(|c| c.is_override).count(),
            events = events.len(),
            "Extracted clause tree"
        );

        Ok(Extraction { tree, events })
    }

    /// Select candidate pairs from a tree built by this extractor
    pub fn select_candidates(&self, tree: &ClauseTree) -> CandidateReport {
        let report = self.rules.selector().select(tree);
        info!(
            candidates = report.candidates.len(),
            truncated_buckets = report.truncations.len(),
            "Selected conflict candidates"
        );
        report
    }
}
