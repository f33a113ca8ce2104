//! Result types for query execution

use serde::Serialize;

use crate::engine::QueryStage;
use crate::value::Record;

/// Result of query execution
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Rows in result order
    pub rows: Vec<Record>,
    /// Number of rows read from the table
    pub scanned_count: usize,
    /// Number of rows returned
    pub returned_count: usize,
    /// Whether LIMIT dropped any rows
    pub limit_applied: bool,
    /// Whether the table came from the engine cache
    pub cache_hit: bool,
    /// Stages visited, in order
    pub stages: Vec<QueryStage>,
}

impl ExecutionResult {
    /// Creates an empty result
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            scanned_count: 0,
            returned_count: 0,
            limit_applied: false,
            cache_hit: false,
            stages: Vec::new(),
        }
    }

    /// Returns true if no rows matched
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns an iterator over the rows
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.rows.iter()
    }

    /// Consumes the result, returning its rows
    pub fn into_rows(self) -> Vec<Record> {
        self.rows
    }
}
