//! Majority voting over repeated oracle calls

use covenant_verifier::{Judgment, VerificationOutcome};

/// Affirming votes needed out of `n`: a strict majority, ties rejected
///
/// Equal to `⌈(n + 1) / 2⌉`.
pub fn required_votes(n: usize) -> usize {
    n / 2 + 1
}

/// Votes collected for one candidate
///
/// Votes that never produced a verdict (failed, timed out, cancelled) are
/// simply absent; they count against the candidate because the majority is
/// measured against the number of votes requested, not received.
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    affirming: Vec<Judgment>,
    received: usize,
}

impl VoteTally {
    /// Create an empty tally
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verified vote
    pub fn record(&mut self, outcome: VerificationOutcome) {
        self.received += 1;
        if let VerificationOutcome::Affirmed(judgment) = outcome {
            self.affirming.push(judgment);
        }
    }

    /// Affirming votes so far
    pub fn affirming(&self) -> usize {
        self.affirming.len()
    }

    /// Votes that produced a verdict
    pub fn received(&self) -> usize {
        self.received
    }

    /// Whether the affirming votes form a majority of `requested`
    pub fn is_accepted(&self, requested: usize) -> bool {
        requested > 0 && self.affirming() >= required_votes(requested)
    }

    /// The affirming vote with the highest confidence
    ///
    /// Ties keep the earliest recorded vote.
    pub fn strongest(&self) -> Option<&Judgment> {
        self.affirming.iter().fold(None, |best: Option<&Judgment>, j| match best {
            Some(b) if b.confidence >= j.confidence => Some(b),
            _ => Some(j),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_domain::{GroundedQuote, Severity};
    use covenant_verifier::RejectionReason;

    fn affirm(confidence: f64, severity: Severity) -> VerificationOutcome {
        let quote = GroundedQuote {
            text: "Net 30".to_string(),
            start: 0,
            end: 6,
            match_ratio: 1.0,
        };
        VerificationOutcome::Affirmed(Judgment {
            confidence,
            severity,
            summary: String::new(),
            explanation: String::new(),
            quote_a: quote.clone(),
            quote_b: quote,
        })
    }

    fn tally(votes: &[bool]) -> VoteTally {
        let mut tally = VoteTally::new();
        for &vote in votes {
            tally.record(if vote {
                affirm(0.9, Severity::High)
            } else {
                VerificationOutcome::NotConflict
            });
        }
        tally
    }

    #[test]
    fn test_required_votes() {
        assert_eq!(required_votes(1), 1);
        assert_eq!(required_votes(2), 2);
        assert_eq!(required_votes(3), 2);
        assert_eq!(required_votes(4), 3);
        assert_eq!(required_votes(5), 3);
    }

    #[test]
    fn test_two_of_three_accepted() {
        assert!(tally(&[true, false, true]).is_accepted(3));
    }

    #[test]
    fn test_one_of_two_rejected() {
        assert!(!tally(&[true, false]).is_accepted(2));
        assert!(tally(&[true, true]).is_accepted(2));
    }

    #[test]
    fn test_missing_votes_count_against() {
        // Two of three requested votes never came back
        let t = tally(&[true]);
        assert_eq!(t.received(), 1);
        assert!(!t.is_accepted(3));
        assert!(t.is_accepted(1));
    }

    #[test]
    fn test_rejections_are_not_affirming() {
        let mut t = VoteTally::new();
        t.record(affirm(0.9, Severity::Low));
        t.record(VerificationOutcome::Rejected(RejectionReason::UnsupportedSpecific(
            "UK".to_string(),
        )));
        assert_eq!(t.affirming(), 1);
        assert_eq!(t.received(), 2);
        assert!(!t.is_accepted(2));
    }

    #[test]
    fn test_strongest_vote() {
        let mut t = VoteTally::new();
        t.record(affirm(0.88, Severity::Low));
        t.record(affirm(0.97, Severity::Critical));
        t.record(affirm(0.97, Severity::Medium));
        assert_eq!(t.strongest().map(|j| j.severity), Some(Severity::Critical));
        assert!(VoteTally::new().strongest().is_none());
    }
}
