//! Query Executor subsystem for tabquery
//!
//! The executor consumes parsed queries and the rows of their table and
//! produces deterministic results.
//!
//! # Execution Flow (strict order)
//!
//! 1. Filter rows by the WHERE clause
//! 2. Group and aggregate (if GROUP BY present)
//! 3. Sort (if ORDER BY present)
//! 4. Apply limit (if LIMIT present)
//! 5. Project selected columns
//!
//! # Guarantees
//!
//! - Same query + same rows = same results, in the same order
//! - Input rows are never mutated
//! - Sorting is stable; grouping preserves first-seen key order

mod aggregate;
mod executor;
mod filters;
mod projection;
mod result;
mod sorter;

pub use aggregate::{AggregateArg, AggregateFunction, Aggregator, SelectItem};
pub use executor::QueryExecutor;
pub use filters::{CompareOp, Connective, Predicate, PredicateFilter, WhereClause, WhereMode};
pub use projection::{apply_limit, project};
pub use result::ExecutionResult;
pub use sorter::ResultSorter;
