//! Covenant Extractor
//!
//! Structures normalized contract text into a clause tree and proposes the
//! clause pairs worth checking for conflicts.
//!
//! # Architecture
//!
//! ```text
//! Text → Scanner → Namespace → Hierarchy → Inheritance → Detector → Topics → Candidates
//! ```
//!
//! Every stage is pure, synchronous computation over one document. All
//! patterns and keyword tables are compiled once into a [`RuleSet`] from an
//! [`ExtractorConfig`].
//!
//! # Example Usage
//!
//! ```
//! use covenant_extractor::ClauseExtractor;
//!
//! let extractor = ClauseExtractor::default_config().unwrap();
//! let text = "1. PAYMENT\n1.1 The Client shall pay each invoice within 30 days.\n";
//!
//! let extraction = extractor.extract(text).unwrap();
//! assert_eq!(extraction.tree.len(), 2);
//!
//! let report = extractor.select_candidates(&extraction.tree);
//! assert!(report.candidates.is_empty());
//! ```

#![warn(missing_docs)]

mod candidates;
mod config;
mod detector;
mod error;
mod extractor;
mod hierarchy;
mod inheritance;
mod namespace;
mod rules;
mod scanner;
mod topics;
mod types;

#[cfg(test)]
mod tests;

pub use candidates::{BucketTruncation, CandidateReport, CandidateSelector};
pub use config::{CategoryKeywords, CategoryTable, ExtractorConfig};
pub use detector::Detector;
pub use error::ExtractorError;
pub use extractor::ClauseExtractor;
pub use inheritance::CategoryMatcher;
pub use namespace::{AppendixContext, ArticleContext, ContextMap, ResolvedMarker};
pub use rules::RuleSet;
pub use scanner::{BoundaryMarker, BoundaryRules, MarkerKind, RegexBoundaryRules};
pub use topics::TopicTagger;
pub use types::{Extraction, ExtractionEvent};
