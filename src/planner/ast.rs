//! Parsed query representation
//!
//! A query is either a full SELECT or a bare table name. Both resolve to a
//! `SelectQuery`; the bare form carries no clauses.

use serde::Serialize;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Parses `asc` / `desc` in any case
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("asc") {
            Some(SortDirection::Asc)
        } else if token.eq_ignore_ascii_case("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        }
    }
}

/// One ORDER BY term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    /// Column to sort by
    pub column: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Which surface form the query was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryForm {
    /// `SELECT ... FROM ...`
    Select,
    /// Just a table name, equivalent to `SELECT * FROM <name>`
    BareTable,
}

/// Parsed query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectQuery {
    /// Surface form
    pub form: QueryForm,
    /// Selected expressions in written order; `["*"]` selects everything
    pub columns: Vec<String>,
    /// Source table
    pub table: String,
    /// Raw WHERE text, interpreted by the predicate evaluator
    #[serde(rename = "where")]
    pub where_clause: Option<String>,
    /// GROUP BY columns
    pub group_by: Option<Vec<String>>,
    /// ORDER BY terms
    pub order_by: Option<Vec<SortSpec>>,
    /// LIMIT row count
    pub limit: Option<u64>,
}

impl SelectQuery {
    /// Creates `SELECT * FROM <table>` with no clauses
    pub fn select_all(table: impl Into<String>) -> Self {
        Self {
            form: QueryForm::Select,
            columns: vec!["*".to_string()],
            table: table.into(),
            where_clause: None,
            group_by: None,
            order_by: None,
            limit: None,
        }
    }

    /// Creates the bare-table form
    pub fn bare(table: impl Into<String>) -> Self {
        Self {
            form: QueryForm::BareTable,
            ..Self::select_all(table)
        }
    }

    /// Sets the selected columns
    pub fn with_columns(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the WHERE text
    pub fn with_where(mut self, condition: impl Into<String>) -> Self {
        self.where_clause = Some(condition.into());
        self
    }

    /// Sets the GROUP BY columns
    pub fn with_group_by(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.group_by = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Adds an ORDER BY term
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.order_by.get_or_insert_with(Vec::new).push(sort);
        self
    }

    /// Sets the LIMIT
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// True for `SELECT *`
    pub fn selects_all(&self) -> bool {
        self.columns.len() == 1 && self.columns[0] == "*"
    }

    /// True if a GROUP BY clause is present
    pub fn is_grouped(&self) -> bool {
        self.group_by.is_some()
    }

    /// True if the projection step applies: ungrouped and not `SELECT *`
    pub fn needs_projection(&self) -> bool {
        !self.is_grouped() && !self.selects_all()
    }
}
