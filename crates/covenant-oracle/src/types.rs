//! Request and response types for classification calls

use covenant_domain::Severity;
use std::collections::BTreeSet;

/// One classification request: is this pair of clauses in conflict?
#[derive(Debug, Clone, PartialEq)]
pub struct OracleRequest {
    /// Display label of clause A (`4.1 PAYMENT`)
    pub clause_a_label: String,

    /// Display label of clause B
    pub clause_b_label: String,

    /// Own body text of clause A
    pub clause_a_text: String,

    /// Own body text of clause B
    pub clause_b_text: String,

    /// Topics both clauses carry
    pub shared_topics: BTreeSet<String>,
}

/// The oracle's untrusted answer
///
/// Every field is re-validated by the verifier before it is believed.
#[derive(Debug, Clone, PartialEq)]
pub struct OracleResponse {
    /// Whether the oracle claims a conflict
    pub is_conflict: bool,

    /// Claimed confidence, nominally in [0, 1]
    pub confidence: f64,

    /// Claimed severity
    pub severity: Severity,

    /// One-line summary
    pub summary: String,

    /// Longer reasoning
    pub explanation: String,

    /// Supporting quote from clause A
    pub quote_a: String,

    /// Supporting quote from clause B
    pub quote_b: String,
}

impl OracleResponse {
    /// A conflict verdict with the given quotes
    pub fn conflict(
        confidence: f64,
        severity: Severity,
        quote_a: impl Into<String>,
        quote_b: impl Into<String>,
    ) -> Self {
        Self {
            is_conflict: true,
            confidence,
            severity,
            summary: String::new(),
            explanation: String::new(),
            quote_a: quote_a.into(),
            quote_b: quote_b.into(),
        }
    }

    /// A no-conflict verdict
    pub fn no_conflict(confidence: f64) -> Self {
        Self {
            is_conflict: false,
            confidence,
            severity: Severity::Low,
            summary: String::new(),
            explanation: String::new(),
            quote_a: String::new(),
            quote_b: String::new(),
        }
    }

    /// Set the summary
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Set the explanation
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }
}
