//! Re-validation of oracle responses

use crate::grounding::Grounder;
use crate::sanity::SanityChecker;
use crate::{VerifierConfig, VerifierError};
use covenant_domain::{GroundedQuote, Severity};
use covenant_oracle::OracleResponse;
use tracing::debug;

/// Which side of a candidate pair a quote belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteSide {
    /// Clause A
    A,
    /// Clause B
    B,
}

impl std::fmt::Display for QuoteSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteSide::A => f.write_str("A"),
            QuoteSide::B => f.write_str("B"),
        }
    }
}

/// Reasons for rejecting an oracle response
#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Confidence outside [0, 1] or not a number
    InvalidConfidence(f64),

    /// Confidence below the configured threshold
    LowConfidence {
        /// Minimum confidence required
        required: f64,
        /// Actual confidence
        actual: f64,
    },

    /// Quote missing or without any usable words
    EmptyQuote(QuoteSide),

    /// Quote not found in its clause
    Ungrounded {
        /// Side the quote belongs to
        side: QuoteSide,
        /// Fraction of quote words found in order
        match_ratio: f64,
    },

    /// Summary asserts a specific that neither clause contains
    UnsupportedSpecific(String),
}

impl RejectionReason {
    /// Short label used in metrics
    pub fn kind(&self) -> &'static str {
        match self {
            RejectionReason::InvalidConfidence(_) => "invalid_confidence",
            RejectionReason::LowConfidence { .. } => "low_confidence",
            RejectionReason::EmptyQuote(_) | RejectionReason::Ungrounded { .. } => "grounding",
            RejectionReason::UnsupportedSpecific(_) => "sanity",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectionReason::InvalidConfidence(c) => write!(f, "invalid confidence {}", c),
            RejectionReason::LowConfidence { required, actual } => {
                write!(f, "confidence {:.2} below {:.2}", actual, required)
            }
            RejectionReason::EmptyQuote(side) => write!(f, "quote {} is empty", side),
            RejectionReason::Ungrounded { side, match_ratio } => {
                write!(f, "quote {} not grounded (ratio {:.2})", side, match_ratio)
            }
            RejectionReason::UnsupportedSpecific(term) => {
                write!(f, "summary asserts '{}' not found in either clause", term)
            }
        }
    }
}

/// An affirming verdict that survived every gate
#[derive(Debug, Clone, PartialEq)]
pub struct Judgment {
    /// Oracle confidence
    pub confidence: f64,
    /// Oracle severity
    pub severity: Severity,
    /// One-line summary
    pub summary: String,
    /// Longer reasoning
    pub explanation: String,
    /// Quote grounded in clause A's body
    pub quote_a: GroundedQuote,
    /// Quote grounded in clause B's body
    pub quote_b: GroundedQuote,
}

/// Result of verifying one oracle response
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationOutcome {
    /// Grounded, confident conflict
    Affirmed(Judgment),

    /// A valid verdict that the clauses do not conflict
    NotConflict,

    /// The response failed a gate
    Rejected(RejectionReason),
}

impl VerificationOutcome {
    /// Whether the outcome counts as an affirming vote
    pub fn is_affirmed(&self) -> bool {
        matches!(self, VerificationOutcome::Affirmed(_))
    }
}

/// The Verifier re-checks every oracle claim against the source text
pub struct Verifier {
    config: VerifierConfig,
    grounder: Grounder,
    sanity: SanityChecker,
}

impl Verifier {
    /// Create a new Verifier with the given configuration
    pub fn new(config: VerifierConfig) -> Result<Self, VerifierError> {
        config.validate().map_err(VerifierError::Config)?;
        let grounder = Grounder::new(config.grounding_threshold, config.min_quote_word_len);
        let sanity = SanityChecker::new(&config)?;
        Ok(Self {
            config,
            grounder,
            sanity,
        })
    }

    /// Create a Verifier with default configuration
    pub fn default_config() -> Result<Self, VerifierError> {
        Self::new(VerifierConfig::default())
    }

    /// Active configuration
    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify an oracle response against the two clause bodies
    ///
    /// Gates run in order: confidence range, verdict, confidence threshold,
    /// grounding of quote A then quote B, summary sanity. The first failing
    /// gate decides the rejection.
    pub fn verify(&self, response: &OracleResponse, body_a: &str, body_b: &str) -> VerificationOutcome {
        let outcome = self.evaluate(response, body_a, body_b);
        if let VerificationOutcome::Rejected(reason) = &outcome {
            debug!(reason = reason.kind(), "Oracle response rejected: {}", reason);
        }
        outcome
    }

    fn evaluate(&self, response: &OracleResponse, body_a: &str, body_b: &str) -> VerificationOutcome {
        let confidence = response.confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return VerificationOutcome::Rejected(RejectionReason::InvalidConfidence(confidence));
        }

        if !response.is_conflict {
            return VerificationOutcome::NotConflict;
        }

        if confidence < self.config.confidence_threshold {
            return VerificationOutcome::Rejected(RejectionReason::LowConfidence {
                required: self.config.confidence_threshold,
                actual: confidence,
            });
        }

        let quote_a = match self.ground(&response.quote_a, body_a, QuoteSide::A) {
            Ok(quote) => quote,
            Err(reason) => return VerificationOutcome::Rejected(reason),
        };
        let quote_b = match self.ground(&response.quote_b, body_b, QuoteSide::B) {
            Ok(quote) => quote,
            Err(reason) => return VerificationOutcome::Rejected(reason),
        };

        if self.config.sanity_check {
            let source = format!("{}\n{}", body_a, body_b);
            if let Some(term) = self.sanity.check(&response.summary, &source) {
                return VerificationOutcome::Rejected(RejectionReason::UnsupportedSpecific(term));
            }
        }

        VerificationOutcome::Affirmed(Judgment {
            confidence,
            severity: response.severity,
            summary: response.summary.clone(),
            explanation: response.explanation.clone(),
            quote_a,
            quote_b,
        })
    }

    fn ground(&self, quote: &str, body: &str, side: QuoteSide) -> Result<GroundedQuote, RejectionReason> {
        let located = self
            .grounder
            .locate(quote, body)
            .ok_or(RejectionReason::EmptyQuote(side))?;
        if located.match_ratio < self.grounder.threshold() {
            return Err(RejectionReason::Ungrounded {
                side,
                match_ratio: located.match_ratio,
            });
        }
        Ok(located)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY_A: &str = "4.1 Payment due Net 30.";
    const BODY_B: &str = "4.2 Payment due Net 60.";

    fn conflict() -> OracleResponse {
        OracleResponse::conflict(0.95, Severity::High, "Net 30", "Net 60")
            .with_summary("Payment terms differ: 30 days vs 60 days")
    }

    #[test]
    fn test_grounded_conflict_affirmed() {
        let verifier = Verifier::default_config().unwrap();
        match verifier.verify(&conflict(), BODY_A, BODY_B) {
            VerificationOutcome::Affirmed(judgment) => {
                assert_eq!(judgment.severity, Severity::High);
                assert_eq!(&BODY_A[judgment.quote_a.start..judgment.quote_a.end], "Net 30");
                assert_eq!(&BODY_B[judgment.quote_b.start..judgment.quote_b.end], "Net 60");
            }
            other => panic!("Expected Affirmed, got {:?}", other),
        }
    }

    #[test]
    fn test_no_conflict_verdict() {
        let verifier = Verifier::default_config().unwrap();
        let outcome = verifier.verify(&OracleResponse::no_conflict(0.4), BODY_A, BODY_B);
        assert_eq!(outcome, VerificationOutcome::NotConflict);
        assert!(!outcome.is_affirmed());
    }

    #[test]
    fn test_low_confidence_rejected() {
        let verifier = Verifier::default_config().unwrap();
        let mut response = conflict();
        response.confidence = 0.84;

        match verifier.verify(&response, BODY_A, BODY_B) {
            VerificationOutcome::Rejected(RejectionReason::LowConfidence { required, actual }) => {
                assert_eq!(required, 0.85);
                assert_eq!(actual, 0.84);
            }
            other => panic!("Expected LowConfidence, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_confidence_rejected() {
        let verifier = Verifier::default_config().unwrap();
        for bad in [f64::NAN, -0.1, 1.5] {
            let mut response = conflict();
            response.confidence = bad;
            let outcome = verifier.verify(&response, BODY_A, BODY_B);
            assert!(matches!(
                outcome,
                VerificationOutcome::Rejected(RejectionReason::InvalidConfidence(_))
            ));
        }
    }

    #[test]
    fn test_ungrounded_quote_rejected() {
        let verifier = Verifier::default_config().unwrap();
        let body = "The Client shall make payment within 30 days of invoice date.";
        let response = OracleResponse::conflict(0.95, Severity::Medium, "payment within 90 days", "Net 60");

        match verifier.verify(&response, body, BODY_B) {
            VerificationOutcome::Rejected(RejectionReason::Ungrounded { side, match_ratio }) => {
                assert_eq!(side, QuoteSide::A);
                assert!(match_ratio < 0.7);
            }
            other => panic!("Expected Ungrounded, got {:?}", other),
        }
    }

    #[test]
    fn test_quote_from_wrong_clause_rejected() {
        let verifier = Verifier::default_config().unwrap();
        let response = OracleResponse::conflict(0.95, Severity::High, "Net 30", "Net 30");
        let outcome = verifier.verify(&response, BODY_A, BODY_B);
        assert!(matches!(
            outcome,
            VerificationOutcome::Rejected(RejectionReason::Ungrounded { side: QuoteSide::B, .. })
        ));
    }

    #[test]
    fn test_empty_quote_rejected() {
        let verifier = Verifier::default_config().unwrap();
        let response = OracleResponse::conflict(0.95, Severity::High, "", "Net 60");
        assert_eq!(
            verifier.verify(&response, BODY_A, BODY_B),
            VerificationOutcome::Rejected(RejectionReason::EmptyQuote(QuoteSide::A))
        );
    }

    #[test]
    fn test_fabricated_summary_rejected() {
        let verifier = Verifier::default_config().unwrap();
        let response = conflict().with_summary("Clause A says 45 days under UK law");

        match verifier.verify(&response, BODY_A, BODY_B) {
            VerificationOutcome::Rejected(reason) => {
                assert_eq!(reason.kind(), "sanity");
                assert_eq!(reason, RejectionReason::UnsupportedSpecific("45 days".to_string()));
            }
            other => panic!("Expected sanity rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_sanity_gate_can_be_disabled() {
        let config = VerifierConfig {
            sanity_check: false,
            ..VerifierConfig::default()
        };
        let verifier = Verifier::new(config).unwrap();
        let response = conflict().with_summary("Clause A says 45 days");
        assert!(verifier.verify(&response, BODY_A, BODY_B).is_affirmed());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = VerifierConfig {
            grounding_threshold: 2.0,
            ..VerifierConfig::default()
        };
        assert!(matches!(Verifier::new(config), Err(VerifierError::Config(_))));
    }
}
