//! Covenant Verifier
//!
//! Independently re-validates every classification the oracle returns before
//! it may count as a vote.
//!
//! The Verifier applies, in order:
//! - Confidence range and threshold checks
//! - Grounding of both quotes inside their clause bodies (order-preserving,
//!   fuzzy word matching)
//! - A sanity check that the summary invents no numbers, dates or governing
//!   laws absent from both clauses
//!
//! A failed gate is a [`RejectionReason`], never an error.
//!
//! # Examples
//!
//! ```
//! use covenant_domain::Severity;
//! use covenant_oracle::OracleResponse;
//! use covenant_verifier::Verifier;
//!
//! let verifier = Verifier::default_config().unwrap();
//! let response = OracleResponse::conflict(0.95, Severity::High, "Net 30", "Net 60");
//!
//! let outcome = verifier.verify(&response, "4.1 Payment due Net 30.", "4.2 Payment due Net 60.");
//! assert!(outcome.is_affirmed());
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod grounding;
mod sanity;
mod verifier;

pub use config::VerifierConfig;
pub use error::VerifierError;
pub use grounding::Grounder;
pub use sanity::SanityChecker;
pub use verifier::{Judgment, QuoteSide, RejectionReason, VerificationOutcome, Verifier};
