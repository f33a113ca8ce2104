//! Query planner subsystem for tabquery
//!
//! Turns raw query text into a `SelectQuery`.
//!
//! # Grammar
//!
//! ```text
//! <table>
//! SELECT <columns> FROM <table> [WHERE ..] [GROUP BY ..] [ORDER BY ..] [LIMIT n]
//! ```
//!
//! Keywords match case-insensitively and as whole words. Literal text keeps
//! its original casing. Only a single table per query is supported.

mod ast;
mod errors;
mod explain;
mod scan;
mod segmenter;

pub use ast::{QueryForm, SelectQuery, SortDirection, SortSpec};
pub use errors::{QueryError, QueryErrorCode, QueryResult, Severity};
pub use explain::ExplainPlan;
pub use scan::{find_keyword, split_top_level, Span};
pub use segmenter::ClauseSegmenter;
