//! Types for extraction results

use covenant_domain::ClauseTree;
use std::fmt;

/// A non-fatal inference made while building the clause tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionEvent {
    /// No boundaries were found; the document became one clause
    NoBoundaries,

    /// A missing parent number was synthesized from a heading line
    GapParentSynthesized {
        /// Number given to the synthetic parent
        number: String,
        /// First child that required it
        child: String,
    },

    /// A missing parent number could not be inferred
    GapUnresolved {
        /// Missing parent number
        number: String,
        /// Child that was attached elsewhere
        child: String,
    },

    /// The parent number exists but was already closed
    ClosedParent {
        /// Closed parent number
        parent: String,
        /// Child that became a root
        child: String,
    },
}

impl ExtractionEvent {
    /// Error-taxonomy name of the event
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionEvent::NoBoundaries => "malformed_document",
            _ => "ambiguous_numbering",
        }
    }
}

impl fmt::Display for ExtractionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionEvent::NoBoundaries => {
                write!(f, "no clause boundaries found, using whole document")
            }
            ExtractionEvent::GapParentSynthesized { number, child } => {
                write!(f, "synthesized parent {} for {}", number, child)
            }
            ExtractionEvent::GapUnresolved { number, child } => {
                write!(f, "parent {} of {} not found", number, child)
            }
            ExtractionEvent::ClosedParent { parent, child } => {
                write!(f, "parent {} of {} is already closed", parent, child)
            }
        }
    }
}

/// Result of extracting one document
#[derive(Debug, Clone)]
pub struct Extraction {
    /// The clause tree
    pub tree: ClauseTree,

    /// Inferences made while building it
    pub events: Vec<ExtractionEvent>,
}
