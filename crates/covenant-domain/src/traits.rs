//! Trait definitions for external interactions
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

use crate::{Clause, RunId, VerifiedConflict};

/// Trait for persisting the output of an analysis run
///
/// Implemented by the infrastructure layer (covenant-store). Whether saving a
/// run id twice overwrites or appends is the implementation's concern.
pub trait AnalysisStore {
    /// Error type for store operations
    type Error;

    /// Persist the clause list and verified conflicts of one run
    fn save_run(
        &mut self,
        run_id: RunId,
        clauses: &[Clause],
        conflicts: &[VerifiedConflict],
    ) -> Result<(), Self::Error>;
}
