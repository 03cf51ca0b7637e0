//! Compiled rule set

use crate::candidates::CandidateSelector;
use crate::config::ExtractorConfig;
use crate::detector::Detector;
use crate::error::ExtractorError;
use crate::inheritance::CategoryMatcher;
use crate::topics::TopicTagger;

/// Every keyword table, pattern and threshold the pure stages use
///
/// Built once from an [`ExtractorConfig`] and shared read-only; nothing is
/// compiled lazily or held in statics.
pub struct RuleSet {
    config: ExtractorConfig,
    categories: CategoryMatcher,
    detector: Detector,
    topics: TopicTagger,
}

impl RuleSet {
    /// Validate the configuration and compile it
    pub fn new(config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;

        Ok(Self {
            categories: CategoryMatcher::new(&config.categories, config.category_scan_chars)?,
            detector: Detector::new(&config)?,
            topics: TopicTagger::new(&config.topics)?,
            config,
        })
    }

    /// Source configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Category matcher
    pub fn categories(&self) -> &CategoryMatcher {
        &self.categories
    }

    /// Override, stub and TOC detector
    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Topic tagger
    pub fn topics(&self) -> &TopicTagger {
        &self.topics
    }

    /// Candidate selector using the configured bucket cap
    pub fn selector(&self) -> CandidateSelector {
        CandidateSelector::new(self.config.topic_bucket_cap)
    }
}
