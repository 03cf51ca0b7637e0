//! Conflict candidates and verified conflicts

use crate::ClauseId;
use std::collections::BTreeSet;

/// Severity assigned by the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Cosmetic or easily reconciled
    Low,
    /// Needs attention before signature
    Medium,
    /// Material inconsistency
    High,
    /// Contradiction that defeats a core obligation
    Critical,
}

impl Severity {
    /// Upper-case wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    /// Parse a severity label (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Severity::Low),
            "MEDIUM" | "MODERATE" => Some(Severity::Medium),
            "HIGH" => Some(Severity::High),
            "CRITICAL" => Some(Severity::Critical),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid severity: {}", s))
    }
}

/// Outcome of a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// The clauses conflict
    Conflict,
    /// The clauses are compatible
    NoConflict,
}

impl Classification {
    /// Wire label
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Conflict => "conflict",
            Classification::NoConflict => "no_conflict",
        }
    }

    /// Build from the oracle's boolean verdict
    pub fn from_verdict(is_conflict: bool) -> Self {
        if is_conflict {
            Classification::Conflict
        } else {
            Classification::NoConflict
        }
    }
}

/// Two clauses proposed for comparison
///
/// Pairs are unordered; constructors normalize so that `clause_a < clause_b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictCandidate {
    /// Earlier clause of the pair
    pub clause_a: ClauseId,

    /// Later clause of the pair
    pub clause_b: ClauseId,

    /// Topics both clauses carry
    pub shared_topics: BTreeSet<String>,

    /// Paired only because one side is an override clause
    pub via_override: bool,
}

impl ConflictCandidate {
    /// Create a normalized candidate
    pub fn new(a: ClauseId, b: ClauseId, shared_topics: BTreeSet<String>) -> Self {
        let (clause_a, clause_b) = if a <= b { (a, b) } else { (b, a) };
        Self {
            clause_a,
            clause_b,
            shared_topics,
            via_override: false,
        }
    }

    /// Normalized pair key
    pub fn key(&self) -> (ClauseId, ClauseId) {
        (self.clause_a, self.clause_b)
    }
}

/// A quote that was located inside a clause body
#[derive(Debug, Clone, PartialEq)]
pub struct GroundedQuote {
    /// Quote as returned by the oracle
    pub text: String,

    /// Byte offset of the first matched word inside the clause body
    pub start: usize,

    /// Byte offset one past the last matched word inside the clause body
    pub end: usize,

    /// Fraction of quote words found in order
    pub match_ratio: f64,
}

/// A candidate that passed grounding and voting
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedConflict {
    /// Earlier clause of the pair
    pub clause_a: ClauseId,

    /// Later clause of the pair
    pub clause_b: ClauseId,

    /// Topics that justified the pairing
    pub shared_topics: BTreeSet<String>,

    /// Final classification
    pub classification: Classification,

    /// Oracle confidence in [0, 1]
    pub confidence: f64,

    /// Oracle severity
    pub severity: Severity,

    /// One-line summary
    pub summary: String,

    /// Longer reasoning
    pub explanation: String,

    /// Grounded quote from clause A
    pub quote_a: GroundedQuote,

    /// Grounded quote from clause B
    pub quote_b: GroundedQuote,

    /// Affirming votes
    pub vote_count: usize,

    /// Votes issued
    pub votes_cast: usize,
}
