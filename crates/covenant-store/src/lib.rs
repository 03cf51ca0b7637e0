//! Covenant Storage Layer
//!
//! Implements the [`AnalysisStore`] trait on SQLite.
//!
//! # Architecture
//!
//! - One row per clause and one row per verified conflict, both keyed by run
//! - Saving a run id again replaces that run's rows inside a transaction
//! - Clause ids are stored as arena indices so a tree can be rebuilt exactly
//!
//! # Examples
//!
//! ```no_run
//! use covenant_store::SqliteStore;
//!
//! let store = SqliteStore::new("covenant.db").unwrap();
//! // Store is now ready to accept analysis runs
//! ```

#![warn(missing_docs)]

use covenant_domain::traits::AnalysisStore;
use covenant_domain::{
    Category, Classification, Clause, ClauseId, ClauseTree, GroundedQuote, RunId, Severity,
    VerifiedConflict,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored topic set could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// SQLite-based implementation of AnalysisStore
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe. Each thread should have its own SqliteStore instance.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given database path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create a store backed by a private in-memory database
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::new(":memory:")
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(include_str!("schema.sql"))?;
        Ok(())
    }

    /// Every stored run, most recent first
    pub fn list_runs(&self) -> Result<Vec<RunId>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT run_id FROM clauses
             UNION SELECT run_id FROM conflicts
             ORDER BY run_id DESC",
        )?;
        let runs = stmt
            .query_map([], |row| {
                let bytes: Vec<u8> = row.get(0)?;
                Self::bytes_to_run_id(&bytes).map_err(|e| conversion(0, Type::Blob, e))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    /// Clauses of one run, in document order
    pub fn load_clauses(&self, run_id: RunId) -> Result<Vec<Clause>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT idx, number, raw_label, parent_idx, depth, heading, category, topics, text,
                    start_char, end_char, body_end, is_override, is_stub, is_toc, is_synthetic
             FROM clauses WHERE run_id = ?1 ORDER BY idx",
        )?;
        let clauses = stmt
            .query_map(params![Self::run_id_to_bytes(run_id)], Self::row_to_clause)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clauses)
    }

    /// Rebuild the clause tree of one run
    pub fn load_tree(&self, run_id: RunId) -> Result<ClauseTree, StoreError> {
        ClauseTree::from_clauses(self.load_clauses(run_id)?).map_err(StoreError::InvalidData)
    }

    /// Verified conflicts of one run, in the order they were saved
    pub fn load_conflicts(&self, run_id: RunId) -> Result<Vec<VerifiedConflict>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT clause_a, clause_b, shared_topics, classification, confidence, severity,
                    summary, explanation,
                    quote_a, quote_a_start, quote_a_end, quote_a_ratio,
                    quote_b, quote_b_start, quote_b_end, quote_b_ratio,
                    vote_count, votes_cast
             FROM conflicts WHERE run_id = ?1 ORDER BY seq",
        )?;
        let conflicts = stmt
            .query_map(params![Self::run_id_to_bytes(run_id)], Self::row_to_conflict)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(conflicts)
    }

    /// Remove every row of one run, returning whether anything was stored
    pub fn delete_run(&mut self, run_id: RunId) -> Result<bool, StoreError> {
        let id_bytes = Self::run_id_to_bytes(run_id);
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM clauses WHERE run_id = ?1", params![&id_bytes])?
            + tx.execute("DELETE FROM conflicts WHERE run_id = ?1", params![&id_bytes])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// Convert RunId to bytes for storage
    ///
    /// Big-endian so that BLOB ordering follows creation time.
    fn run_id_to_bytes(id: RunId) -> Vec<u8> {
        id.value().to_be_bytes().to_vec()
    }

    /// Convert bytes to RunId
    fn bytes_to_run_id(bytes: &[u8]) -> Result<RunId, StoreError> {
        let arr: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::InvalidData(format!("Expected 16 bytes for RunId, got {}", bytes.len()))
        })?;
        Ok(RunId::from_value(u128::from_be_bytes(arr)))
    }

    fn str_to_classification(s: &str) -> Result<Classification, StoreError> {
        match s {
            "conflict" => Ok(Classification::Conflict),
            "no_conflict" => Ok(Classification::NoConflict),
            _ => Err(StoreError::InvalidData(format!("Unknown classification: {}", s))),
        }
    }

    fn row_to_clause(row: &Row<'_>) -> rusqlite::Result<Clause> {
        let parent: Option<i64> = row.get(3)?;
        let category: Option<String> = row.get(6)?;
        let category = match category {
            Some(label) => Some(Category::parse(&label).ok_or_else(|| {
                conversion(6, Type::Text, StoreError::InvalidData(format!("Unknown category: {}", label)))
            })?),
            None => None,
        };
        let topics: String = row.get(7)?;

        Ok(Clause {
            id: ClauseId::from_index(get_usize(row, 0)?),
            number: row.get(1)?,
            raw_label: row.get(2)?,
            parent_id: parent.map(|p| ClauseId::from_index(p as usize)),
            depth: get_usize(row, 4)?,
            heading: row.get(5)?,
            category,
            topics: decode_topics(7, &topics)?,
            text: row.get(8)?,
            start_char: get_usize(row, 9)?,
            end_char: get_usize(row, 10)?,
            body_end: get_usize(row, 11)?,
            is_override: row.get(12)?,
            is_stub: row.get(13)?,
            is_toc: row.get(14)?,
            is_synthetic: row.get(15)?,
        })
    }

    fn row_to_conflict(row: &Row<'_>) -> rusqlite::Result<VerifiedConflict> {
        let topics: String = row.get(2)?;
        let classification: String = row.get(3)?;
        let severity: String = row.get(5)?;

        Ok(VerifiedConflict {
            clause_a: ClauseId::from_index(get_usize(row, 0)?),
            clause_b: ClauseId::from_index(get_usize(row, 1)?),
            shared_topics: decode_topics(2, &topics)?,
            classification: Self::str_to_classification(&classification)
                .map_err(|e| conversion(3, Type::Text, e))?,
            confidence: row.get(4)?,
            severity: Severity::parse(&severity).ok_or_else(|| {
                conversion(5, Type::Text, StoreError::InvalidData(format!("Unknown severity: {}", severity)))
            })?,
            summary: row.get(6)?,
            explanation: row.get(7)?,
            quote_a: GroundedQuote {
                text: row.get(8)?,
                start: get_usize(row, 9)?,
                end: get_usize(row, 10)?,
                match_ratio: row.get(11)?,
            },
            quote_b: GroundedQuote {
                text: row.get(12)?,
                start: get_usize(row, 13)?,
                end: get_usize(row, 14)?,
                match_ratio: row.get(15)?,
            },
            vote_count: get_usize(row, 16)?,
            votes_cast: get_usize(row, 17)?,
        })
    }
}

impl AnalysisStore for SqliteStore {
    type Error = StoreError;

    fn save_run(
        &mut self,
        run_id: RunId,
        clauses: &[Clause],
        conflicts: &[VerifiedConflict],
    ) -> Result<(), Self::Error> {
        let id_bytes = Self::run_id_to_bytes(run_id);
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM clauses WHERE run_id = ?1", params![&id_bytes])?;
        tx.execute("DELETE FROM conflicts WHERE run_id = ?1", params![&id_bytes])?;

        {
            let mut insert = tx.prepare(
                "INSERT INTO clauses (run_id, idx, number, raw_label, parent_idx, depth, heading,
                                      category, topics, text, start_char, end_char, body_end,
                                      is_override, is_stub, is_toc, is_synthetic)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            )?;
            for clause in clauses {
                insert.execute(params![
                    &id_bytes,
                    clause.id.index() as i64,
                    &clause.number,
                    &clause.raw_label,
                    clause.parent_id.map(|p| p.index() as i64),
                    clause.depth as i64,
                    &clause.heading,
                    clause.category.map(|c| c.as_str()),
                    serde_json::to_string(&clause.topics)?,
                    &clause.text,
                    clause.start_char as i64,
                    clause.end_char as i64,
                    clause.body_end as i64,
                    clause.is_override,
                    clause.is_stub,
                    clause.is_toc,
                    clause.is_synthetic,
                ])?;
            }
        }

        {
            let mut insert = tx.prepare(
                "INSERT INTO conflicts (run_id, seq, clause_a, clause_b, shared_topics, classification,
                                        confidence, severity, summary, explanation,
                                        quote_a, quote_a_start, quote_a_end, quote_a_ratio,
                                        quote_b, quote_b_start, quote_b_end, quote_b_ratio,
                                        vote_count, votes_cast)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)",
            )?;
            for (seq, conflict) in conflicts.iter().enumerate() {
                insert.execute(params![
                    &id_bytes,
                    seq as i64,
                    conflict.clause_a.index() as i64,
                    conflict.clause_b.index() as i64,
                    serde_json::to_string(&conflict.shared_topics)?,
                    conflict.classification.as_str(),
                    conflict.confidence,
                    conflict.severity.as_str(),
                    &conflict.summary,
                    &conflict.explanation,
                    &conflict.quote_a.text,
                    conflict.quote_a.start as i64,
                    conflict.quote_a.end as i64,
                    conflict.quote_a.match_ratio,
                    &conflict.quote_b.text,
                    conflict.quote_b.start as i64,
                    conflict.quote_b.end as i64,
                    conflict.quote_b.match_ratio,
                    conflict.vote_count as i64,
                    conflict.votes_cast as i64,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn conversion(column: usize, ty: Type, err: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, ty, Box::new(err))
}

fn get_usize(row: &Row<'_>, column: usize) -> rusqlite::Result<usize> {
    let value: i64 = row.get(column)?;
    usize::try_from(value).map_err(|_| {
        conversion(
            column,
            Type::Integer,
            StoreError::InvalidData(format!("Negative value {} in column {}", value, column)),
        )
    })
}

fn decode_topics(column: usize, json: &str) -> rusqlite::Result<BTreeSet<String>> {
    serde_json::from_str(json).map_err(|e| conversion(column, Type::Text, e.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_bytes_roundtrip() {
        let id = RunId::new();
        let bytes = SqliteStore::run_id_to_bytes(id);
        assert_eq!(bytes.len(), 16);
        assert_eq!(SqliteStore::bytes_to_run_id(&bytes).unwrap(), id);
    }

    #[test]
    fn test_bytes_to_run_id_rejects_wrong_length() {
        let err = SqliteStore::bytes_to_run_id(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn test_classification_labels() {
        for c in [Classification::Conflict, Classification::NoConflict] {
            assert_eq!(SqliteStore::str_to_classification(c.as_str()).unwrap(), c);
        }
        assert!(SqliteStore::str_to_classification("maybe").is_err());
    }

    #[test]
    fn test_empty_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.list_runs().unwrap().is_empty());
        assert!(store.load_clauses(RunId::new()).unwrap().is_empty());
        assert!(store.load_conflicts(RunId::new()).unwrap().is_empty());
    }

    #[test]
    fn test_delete_missing_run() {
        let mut store = SqliteStore::in_memory().unwrap();
        assert!(!store.delete_run(RunId::new()).unwrap());
    }
}
