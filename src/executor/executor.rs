//! Query executor for tabquery
//!
//! Runs a parsed query over the rows of its table, producing deterministic
//! results.
//!
//! Execution flow (strict order):
//! 1. Filter rows by the WHERE clause
//! 2. Group and aggregate (if GROUP BY present)
//! 3. Sort (if ORDER BY present)
//! 4. Apply limit (if LIMIT present)
//! 5. Project selected columns (ungrouped, non-`*` selections only)

use crate::engine::QueryStage;
use crate::planner::{QueryForm, QueryResult, SelectQuery};
use crate::value::Record;

use super::aggregate::Aggregator;
use super::filters::{PredicateFilter, WhereMode};
use super::projection::{apply_limit, project};
use super::result::ExecutionResult;
use super::sorter::ResultSorter;

/// Query executor that processes parsed queries against table rows
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExecutor {
    mode: WhereMode,
}

impl QueryExecutor {
    /// Creates a new executor
    pub fn new(mode: WhereMode) -> Self {
        Self { mode }
    }

    /// Executes a query over `rows` and returns results.
    ///
    /// The returned stage list covers only the stages run here; parsing and
    /// fetching belong to the engine. Same query + same rows = same results.
    pub fn execute(&self, query: &SelectQuery, rows: &[Record]) -> QueryResult<ExecutionResult> {
        let scanned_count = rows.len();

        if query.form == QueryForm::BareTable {
            return Ok(ExecutionResult {
                rows: rows.to_vec(),
                scanned_count,
                returned_count: scanned_count,
                limit_applied: false,
                cache_hit: false,
                stages: Vec::new(),
            });
        }

        let mut stages = vec![QueryStage::Filtering];
        let mut results = match &query.where_clause {
            Some(text) => PredicateFilter::filter(rows, text, self.mode),
            None => rows.to_vec(),
        };

        if let Some(group_by) = &query.group_by {
            stages.push(QueryStage::Grouping);
            results = Aggregator::group_and_aggregate(&results, &query.columns, group_by)
                .map_err(|e| e.at_stage(QueryStage::Grouping))?;
        }

        if let Some(order_by) = &query.order_by {
            stages.push(QueryStage::Ordering);
            ResultSorter::sort(&mut results, order_by);
        }

        let mut limit_applied = false;
        if let Some(limit) = query.limit {
            stages.push(QueryStage::Limiting);
            limit_applied = apply_limit(&mut results, limit);
        }

        if query.needs_projection() {
            stages.push(QueryStage::Projecting);
            results = project(&results, &query.columns);
        }

        Ok(ExecutionResult {
            returned_count: results.len(),
            rows: results,
            scanned_count,
            limit_applied,
            cache_hit: false,
            stages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{QueryErrorCode, SortSpec};
    use crate::value::Value;

    fn products() -> Vec<Record> {
        vec![
            Record::new()
                .with("productName", "Chai")
                .with("unitPrice", 18.0)
                .with("categoryID", 1.0),
            Record::new()
                .with("productName", "Chang")
                .with("unitPrice", 19.0)
                .with("categoryID", 1.0),
            Record::new()
                .with("productName", "Aniseed Syrup")
                .with("unitPrice", 10.0)
                .with("categoryID", 2.0),
            Record::new()
                .with("productName", "Ikura")
                .with("unitPrice", 31.0)
                .with("categoryID", 8.0),
        ]
    }

    fn names(result: &ExecutionResult) -> Vec<String> {
        result
            .iter()
            .map(|r| r.get_or_null("productName").to_string())
            .collect()
    }

    #[test]
    fn test_bare_table_returns_all_rows() {
        let result = QueryExecutor::default()
            .execute(&SelectQuery::bare("products"), &products())
            .unwrap();
        assert_eq!(result.len(), 4);
        assert!(result.stages.is_empty());
    }

    #[test]
    fn test_filter_sort_limit_project() {
        let query = SelectQuery::select_all("products")
            .with_columns(["productName"])
            .with_where("unitPrice > 15")
            .with_sort(SortSpec::desc("unitPrice"))
            .with_limit(2);

        let result = QueryExecutor::default().execute(&query, &products()).unwrap();
        assert_eq!(names(&result), vec!["Ikura", "Chang"]);
        assert!(result.limit_applied);
        assert_eq!(result.scanned_count, 4);
        assert_eq!(result.returned_count, 2);
        assert!(!result.rows[0].contains("unitPrice"));
        assert_eq!(
            result.stages,
            vec![
                QueryStage::Filtering,
                QueryStage::Ordering,
                QueryStage::Limiting,
                QueryStage::Projecting
            ]
        );
    }

    #[test]
    fn test_order_by_unselected_column() {
        // Sorting runs before projection
        let query = SelectQuery::select_all("products")
            .with_columns(["productName"])
            .with_sort(SortSpec::asc("unitPrice"));

        let result = QueryExecutor::default().execute(&query, &products()).unwrap();
        assert_eq!(names(&result), vec!["Aniseed Syrup", "Chai", "Chang", "Ikura"]);
    }

    #[test]
    fn test_grouped_query_skips_projection() {
        let query = SelectQuery::select_all("products")
            .with_columns(["categoryID", "COUNT(*)"])
            .with_group_by(["categoryID"])
            .with_sort(SortSpec::desc("COUNT(*)"));

        let result = QueryExecutor::default().execute(&query, &products()).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.rows[0].get("COUNT(*)"), Some(&Value::Number(2.0)));
        assert!(!result.stages.contains(&QueryStage::Projecting));
    }

    #[test]
    fn test_aggregation_error_tagged_with_stage() {
        let query = SelectQuery::select_all("products")
            .with_columns(["categoryID", "MEDIAN(unitPrice)"])
            .with_group_by(["categoryID"]);

        let err = QueryExecutor::default().execute(&query, &products()).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::UnsupportedAggregation);
        assert_eq!(err.stage(), Some(QueryStage::Grouping));
    }

    #[test]
    fn test_aggregation_error_on_empty_filter_result() {
        let query = SelectQuery::select_all("products")
            .with_columns(["MEDIAN(unitPrice)"])
            .with_where("unitPrice > 1000")
            .with_group_by(["categoryID"]);

        let err = QueryExecutor::default().execute(&query, &products()).unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::UnsupportedAggregation);
    }

    #[test]
    fn test_where_mode_changes_or_handling() {
        let query = SelectQuery::select_all("products")
            .with_where("categoryID = 8 OR unitPrice < 11");

        let compat = QueryExecutor::new(WhereMode::Compat)
            .execute(&query, &products())
            .unwrap();
        assert!(compat.is_empty());

        let strict = QueryExecutor::new(WhereMode::Strict)
            .execute(&query, &products())
            .unwrap();
        assert_eq!(names(&strict), vec!["Aniseed Syrup", "Ikura"]);
    }
}
