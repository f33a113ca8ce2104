//! Table sources
//!
//! The engine reaches table data only through two traits:
//!
//! - `TableProvider` loads the rows of one table, asynchronously
//! - `TableCatalog` lists the table names that exist
//!
//! Two sources ship with the crate: `MemoryTables` (rows held in memory,
//! loadable from JSON) and `CsvDirectory` (one CSV file per table).

mod csv;
mod errors;
mod memory;
mod provider;

pub use csv::{detect_delimiter, parse_csv, CsvDirectory};
pub use errors::{SourceError, SourceResult};
pub use memory::MemoryTables;
pub use provider::{TableCatalog, TableProvider};
