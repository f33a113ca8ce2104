//! # Table Source Errors

use thiserror::Error;

/// Result type for table source operations
pub type SourceResult<T> = Result<T, SourceError>;

/// Errors raised while loading table rows
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("Unknown table: {0}")]
    UnknownTable(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Malformed data in table '{table}' at line {line}: {reason}")]
    Malformed {
        table: String,
        line: usize,
        reason: String,
    },

    #[error("Invalid table data: {0}")]
    InvalidData(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SourceError {
    /// True when the table simply does not exist
    pub fn is_unknown_table(&self) -> bool {
        matches!(self, SourceError::UnknownTable(_))
    }
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        SourceError::Io(err.to_string())
    }
}
