//! CLI module for tabquery
//!
//! Provides command-line interface for:
//! - query: One-shot query execution
//! - tables: List tables
//! - schema: Show a table's columns
//! - explain: One-shot explain
//! - shell: Line-oriented query loop over stdin

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{explain, query, run, run_command, schema, shell, tables, CsvEngine};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_lines, write_error, write_response};
