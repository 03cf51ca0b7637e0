//! Covenant Domain Layer
//!
//! Core model shared by every Covenant crate. Like the rest of the domain
//! layer it carries no infrastructure: pure value types, the clause arena, and
//! the trait the persistence collaborator implements.
//!
//! ## Key Concepts
//!
//! - **Clause**: a contiguous, structurally placed span of contract text
//! - **ClauseTree**: the arena owning every clause of one extraction run
//! - **Category**: resolved subject label, inherited down the tree
//! - **ConflictCandidate**: two clauses proposed for comparison
//! - **VerifiedConflict**: a candidate that survived grounding and voting
//! - **RunId**: identifier of one analysis run
//!
//! ## Architecture
//!
//! - Only dependency is `uuid` for run identifiers
//! - Parent links are arena indices, never references, so malformed numbering
//!   cannot create cycles or aliasing
//! - Infrastructure implementations (stores, oracles) live in other crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod category;
pub mod clause;
pub mod conflict;
pub mod run;
pub mod traits;

// Re-exports for convenience
pub use category::Category;
pub use clause::{Clause, ClauseId, ClauseTree};
pub use conflict::{
    Classification, ConflictCandidate, GroundedQuote, Severity, VerifiedConflict,
};
pub use run::RunId;
