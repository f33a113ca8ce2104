//! Query engine façade
//!
//! Ties the pipeline together: segment the query, resolve and load its
//! table (through the cache), run the executor, and record what happened.

use std::sync::Arc;

use uuid::Uuid;

use crate::executor::{ExecutionResult, QueryExecutor};
use crate::observability::{
    log_event_with_fields, Event, MetricsRegistry, MetricsSnapshot, ObservationScope,
};
use crate::planner::{ClauseSegmenter, ExplainPlan, QueryError, QueryResult};
use crate::source::{SourceError, TableCatalog, TableProvider};
use crate::value::Record;

use super::cache::{CacheStats, TableCache};
use super::stage::QueryStage;
use super::EngineOptions;

/// Executes queries against the tables of one provider.
///
/// Each engine owns its own cache and metrics. Engines are `Send + Sync`
/// when their provider and catalog are, so one instance can serve
/// concurrent queries behind an `Arc`.
pub struct QueryEngine<P, C> {
    provider: P,
    catalog: C,
    cache: TableCache,
    options: EngineOptions,
    metrics: MetricsRegistry,
}

impl<S> QueryEngine<Arc<S>, Arc<S>>
where
    S: TableProvider + TableCatalog,
{
    /// Engine over a source that is its own catalog
    pub fn from_source(source: S) -> Self {
        let source = Arc::new(source);
        Self::new(Arc::clone(&source), source)
    }
}

impl<P, C> QueryEngine<P, C>
where
    P: TableProvider,
    C: TableCatalog,
{
    /// Creates an engine with default options
    pub fn new(provider: P, catalog: C) -> Self {
        Self::with_options(provider, catalog, EngineOptions::default())
    }

    pub fn with_options(provider: P, catalog: C, options: EngineOptions) -> Self {
        Self {
            provider,
            catalog,
            cache: TableCache::new(),
            options,
            metrics: MetricsRegistry::new(),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Executes a query and returns its rows
    pub async fn execute(&self, query: &str) -> QueryResult<Vec<Record>> {
        self.execute_with_stats(query)
            .await
            .map(ExecutionResult::into_rows)
    }

    /// Executes a query and returns its rows with execution details
    pub async fn execute_with_stats(&self, query: &str) -> QueryResult<ExecutionResult> {
        let query_id = Uuid::new_v4().to_string();
        let scope = ObservationScope::with_fields("QUERY", &[("query_id", query_id.as_str())]);

        match self.run(query).await {
            Ok(result) => {
                self.metrics.increment_queries_executed();
                self.metrics.add_rows_returned(result.returned_count as u64);
                scope.complete_with_fields(&[
                    ("rows", result.returned_count.to_string().as_str()),
                    ("scanned", result.scanned_count.to_string().as_str()),
                    ("cache_hit", if result.cache_hit { "true" } else { "false" }),
                ]);
                Ok(result)
            }
            Err(err) => {
                self.metrics.increment_queries_rejected();
                let stage = err.stage().unwrap_or(QueryStage::Failed);
                scope.fail_with_fields(&[
                    ("code", err.code().code()),
                    ("reason", err.message()),
                    ("stage", stage.as_str()),
                    ("table", err.table().unwrap_or("")),
                ]);
                Err(err)
            }
        }
    }

    /// Describes how a query would run, without loading any table
    pub fn explain(&self, query: &str) -> ExplainPlan {
        let known = self.catalog.table_names();
        let parsed = ClauseSegmenter::segment(query, &known).and_then(|mut parsed| {
            parsed.table = resolve_table(&parsed.table, &known)
                .ok_or_else(|| QueryError::table_not_found(&parsed.table))?;
            Ok(parsed)
        });

        match parsed {
            Ok(parsed) => ExplainPlan::from_query(&parsed),
            Err(err) => ExplainPlan::from_error(&err),
        }
    }

    /// Table names known to the catalog
    pub fn list_tables(&self) -> Vec<String> {
        self.catalog.table_names()
    }

    /// Column names of a table's first row. Empty if the table has no rows,
    /// does not exist, or cannot be loaded.
    pub async fn get_schema(&self, table: &str) -> Vec<String> {
        let known = self.catalog.table_names();
        let Some(table) = resolve_table(table, &known) else {
            return Vec::new();
        };

        match self.load_table(&table).await {
            Ok((rows, _)) => rows
                .first()
                .map(|row| row.columns().map(String::from).collect())
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    /// Drops every cached table
    pub fn clear_cache(&self) {
        let dropped = self.cache.clear();
        log_event_with_fields(Event::CacheCleared, &[("tables", dropped.to_string().as_str())]);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn run(&self, raw: &str) -> QueryResult<ExecutionResult> {
        let known = self.catalog.table_names();
        let query = ClauseSegmenter::segment(raw, &known)
            .map_err(|e| e.at_stage(QueryStage::Parsing))?;

        let table = resolve_table(&query.table, &known).ok_or_else(|| {
            QueryError::table_not_found(&query.table).at_stage(QueryStage::Fetching)
        })?;
        let (rows, cache_hit) = self
            .load_table(&table)
            .await
            .map_err(|e| e.at_stage(QueryStage::Fetching))?;

        let mut result = QueryExecutor::new(self.options.where_mode).execute(&query, &rows)?;

        let mut stages = vec![QueryStage::Parsing, QueryStage::Fetching];
        stages.append(&mut result.stages);
        stages.push(QueryStage::Done);
        result.stages = stages;
        result.cache_hit = cache_hit;

        Ok(result)
    }

    /// Cached rows of `table`, fetching them on first use.
    ///
    /// A table with zero rows is reported as not found and is not cached.
    async fn load_table(&self, table: &str) -> QueryResult<(Arc<Vec<Record>>, bool)> {
        if let Some(rows) = self.cache.get(table) {
            self.metrics.increment_cache_hits();
            return Ok((rows, true));
        }
        self.metrics.increment_cache_misses();

        let rows = match self.provider.fetch_table(table).await {
            Ok(rows) => rows,
            Err(err) => {
                log_event_with_fields(
                    Event::TableLoadFailed,
                    &[("table", table), ("reason", err.to_string().as_str())],
                );
                return Err(classify_source_error(table, err));
            }
        };
        self.metrics.increment_table_fetches();

        if rows.is_empty() {
            return Err(QueryError::table_not_found(table));
        }

        log_event_with_fields(
            Event::TableLoaded,
            &[("table", table), ("rows", rows.len().to_string().as_str())],
        );
        Ok((self.cache.insert(table, rows), false))
    }
}

/// Catalog spelling of `table`: an exact match, else the first
/// case-insensitive one
fn resolve_table(table: &str, known: &[String]) -> Option<String> {
    known
        .iter()
        .find(|name| name.as_str() == table)
        .or_else(|| known.iter().find(|name| name.eq_ignore_ascii_case(table)))
        .cloned()
}

fn classify_source_error(table: &str, err: SourceError) -> QueryError {
    if err.is_unknown_table() {
        QueryError::table_not_found(table)
    } else {
        QueryError::table_unavailable(table, err)
    }
}
