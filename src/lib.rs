//! tabquery - SQL-style queries over tables of records
//!
//! A query is segmented into clauses, its table is loaded through a
//! `TableProvider` (and cached per engine), and the rows are filtered,
//! grouped, sorted, limited and projected in that order.
//!
//! ```ignore
//! use tabquery::engine::QueryEngine;
//! use tabquery::source::MemoryTables;
//!
//! let engine = QueryEngine::from_source(MemoryTables::from_json(&tables)?);
//! let rows = engine.execute("SELECT productName FROM products LIMIT 5").await?;
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod executor;
pub mod observability;
pub mod planner;
pub mod source;
pub mod value;
