//! Clause categories

/// Resolved subject category of a clause
///
/// Categories come in three tiers that are checked in order during
/// inheritance: specific, moderate and generic. A clause without an own-text
/// hit takes its parent's resolved category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Fees, invoicing, payment terms
    Payment,
    /// Termination and suspension rights
    Termination,
    /// Liability, indemnities, caps
    Liability,
    /// Confidentiality and non-disclosure
    Confidentiality,
    /// Disputes, governing law, jurisdiction
    Dispute,
    /// Definitions and interpretation
    Definitions,
    /// Appendices, schedules, annexes
    Appendix,
    /// Duration and renewal
    Term,
    /// Scope of work or services
    Scope,
    /// Identification of the parties
    Parties,
    /// Miscellaneous / boilerplate
    General,
}

impl Category {
    /// Every category, specific tier first
    pub const ALL: [Category; 11] = [
        Category::Payment,
        Category::Termination,
        Category::Liability,
        Category::Confidentiality,
        Category::Dispute,
        Category::Definitions,
        Category::Appendix,
        Category::Term,
        Category::Scope,
        Category::Parties,
        Category::General,
    ];

    /// Upper-case label as used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Payment => "PAYMENT",
            Category::Termination => "TERMINATION",
            Category::Liability => "LIABILITY",
            Category::Confidentiality => "CONFIDENTIALITY",
            Category::Dispute => "DISPUTE",
            Category::Definitions => "DEFINITIONS",
            Category::Appendix => "APPENDIX",
            Category::Term => "TERM",
            Category::Scope => "SCOPE",
            Category::Parties => "PARTIES",
            Category::General => "GENERAL",
        }
    }

    /// Parse a category label (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid category: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Category::parse("payment"), Some(Category::Payment));
        assert_eq!(Category::parse(" Dispute "), Some(Category::Dispute));
        assert_eq!(Category::parse("unknown"), None);
    }

    #[test]
    fn test_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }
}
