//! Explain output
//!
//! Describes how a query would run without fetching any data.

use std::fmt;

use serde::Serialize;

use super::ast::SelectQuery;
use super::errors::QueryError;
use crate::engine::QueryStage;

/// Explain plan output
#[derive(Debug, Clone, Serialize)]
pub struct ExplainPlan {
    /// Whether parsing succeeded
    pub accepted: bool,
    /// Source table (if accepted)
    pub table: Option<String>,
    /// Selected expressions
    pub columns: Vec<String>,
    /// Raw WHERE text
    #[serde(rename = "where")]
    pub where_clause: Option<String>,
    /// GROUP BY columns
    pub group_by: Vec<String>,
    /// ORDER BY terms rendered as `column direction`
    pub order_by: Vec<String>,
    /// Limit
    pub limit: Option<u64>,
    /// Pipeline stages that would run, in order
    pub stages: Vec<QueryStage>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a parsed query
    pub fn from_query(query: &SelectQuery) -> Self {
        let order_by = query
            .order_by
            .iter()
            .flatten()
            .map(|s| format!("{} {}", s.column, s.direction.as_str()))
            .collect();

        Self {
            accepted: true,
            table: Some(query.table.clone()),
            columns: query.columns.clone(),
            where_clause: query.where_clause.clone(),
            group_by: query.group_by.clone().unwrap_or_default(),
            order_by,
            limit: query.limit,
            stages: QueryStage::plan_for(query),
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a parse error
    pub fn from_error(err: &QueryError) -> Self {
        Self {
            accepted: false,
            table: None,
            columns: Vec::new(),
            where_clause: None,
            group_by: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            stages: Vec::new(),
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.accepted {
            return write!(
                f,
                "REJECTED {}: {}",
                self.rejection_code.as_deref().unwrap_or("UNKNOWN"),
                self.rejection_reason.as_deref().unwrap_or("")
            );
        }

        writeln!(f, "table: {}", self.table.as_deref().unwrap_or(""))?;
        writeln!(f, "columns: {}", self.columns.join(", "))?;
        if let Some(cond) = &self.where_clause {
            writeln!(f, "where: {}", cond)?;
        }
        if !self.group_by.is_empty() {
            writeln!(f, "group by: {}", self.group_by.join(", "))?;
        }
        if !self.order_by.is_empty() {
            writeln!(f, "order by: {}", self.order_by.join(", "))?;
        }
        if let Some(limit) = self.limit {
            writeln!(f, "limit: {}", limit)?;
        }
        let stages: Vec<&str> = self.stages.iter().map(|s| s.as_str()).collect();
        write!(f, "stages: {}", stages.join(" -> "))
    }
}
