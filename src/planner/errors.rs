//! Query error types
//!
//! Error codes:
//! - TABQ_INVALID_SYNTAX (REJECT)
//! - TABQ_UNSUPPORTED_QUERY_TYPE (REJECT)
//! - TABQ_TABLE_NOT_FOUND (REJECT)
//! - TABQ_UNSUPPORTED_AGGREGATION (REJECT)
//!
//! Every error is terminal for the query that raised it.

use std::fmt;

use crate::engine::QueryStage;

/// Severity levels for query errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Query rejected, engine state untouched
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Query error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Malformed SELECT, clause, or aggregate expression
    InvalidSyntax,
    /// Neither a SELECT nor a known bare table name
    UnsupportedQueryType,
    /// Table unknown, empty, or could not be loaded
    TableNotFound,
    /// Aggregate function outside COUNT/SUM/AVG/MIN/MAX
    UnsupportedAggregation,
}

impl QueryErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::InvalidSyntax => "TABQ_INVALID_SYNTAX",
            QueryErrorCode::UnsupportedQueryType => "TABQ_UNSUPPORTED_QUERY_TYPE",
            QueryErrorCode::TableNotFound => "TABQ_TABLE_NOT_FOUND",
            QueryErrorCode::UnsupportedAggregation => "TABQ_UNSUPPORTED_AGGREGATION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with full context
#[derive(Debug, Clone)]
pub struct QueryError {
    /// Error code
    code: QueryErrorCode,
    /// Human-readable message
    message: String,
    /// Table name if applicable
    table: Option<String>,
    /// Pipeline stage that raised the error
    stage: Option<QueryStage>,
}

impl QueryError {
    fn new(code: QueryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            table: None,
            stage: None,
        }
    }

    /// Create an invalid syntax error
    pub fn invalid_syntax(reason: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::InvalidSyntax, reason)
    }

    /// Create an unsupported query type error
    pub fn unsupported_query_type(input: &str) -> Self {
        let shown: String = input.chars().take(40).collect();
        Self::new(
            QueryErrorCode::UnsupportedQueryType,
            format!("Expected SELECT or a table name, got '{}'", shown),
        )
    }

    /// Create a table not found error
    pub fn table_not_found(table: impl Into<String>) -> Self {
        let t = table.into();
        Self {
            table: Some(t.clone()),
            ..Self::new(
                QueryErrorCode::TableNotFound,
                format!("Table '{}' not found", t),
            )
        }
    }

    /// Create a table not found error for a table that exists but could not be loaded
    pub fn table_unavailable(table: impl Into<String>, reason: impl fmt::Display) -> Self {
        let t = table.into();
        Self {
            table: Some(t.clone()),
            ..Self::new(
                QueryErrorCode::TableNotFound,
                format!("Table '{}' could not be loaded: {}", t, reason),
            )
        }
    }

    /// Create an unsupported aggregation error
    pub fn unsupported_aggregation(function: &str) -> Self {
        Self::new(
            QueryErrorCode::UnsupportedAggregation,
            format!(
                "Aggregate function '{}' is not supported (expected COUNT, SUM, AVG, MIN or MAX)",
                function
            ),
        )
    }

    /// Tags the error with the stage that raised it. The first tag wins.
    pub fn at_stage(mut self, stage: QueryStage) -> Self {
        if self.stage.is_none() {
            self.stage = Some(stage);
        }
        self
    }

    /// Returns the error code
    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the table name if applicable
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Returns the stage that raised the error, if known
    pub fn stage(&self) -> Option<QueryStage> {
        self.stage
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )?;
        if let Some(stage) = self.stage {
            write!(f, " (stage: {})", stage)?;
        }
        Ok(())
    }
}

impl std::error::Error for QueryError {}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
