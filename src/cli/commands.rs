//! CLI command implementations
//!
//! Every command loads the configuration, builds an engine over the CSV
//! files in `data_dir`, and answers on stdout with one JSON envelope per
//! response. Engine logs go to stderr.

use std::path::Path;

use serde_json::json;
use tokio::runtime::Runtime;

use crate::config::EngineConfig;
use crate::engine::QueryEngine;
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::planner::QueryError;
use crate::source::CsvDirectory;

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_lines, write_error, write_response};

/// Engine over a CSV directory that is its own catalog
pub type CsvEngine = QueryEngine<CsvDirectory, CsvDirectory>;

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}

/// Run a parsed command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query { sql, config } => query(&config, &sql),
        Command::Tables { config } => tables(&config),
        Command::Schema { table, config } => schema(&config, &table),
        Command::Explain { sql, config } => explain(&config, &sql),
        Command::Shell { config } => shell(&config),
    }
}

/// Execute one query and print its result
pub fn query(config_path: &Path, sql: &str) -> CliResult<()> {
    let engine = open_engine(config_path)?;
    let rt = runtime()?;

    match rt.block_on(engine.execute_with_stats(sql)) {
        Ok(result) => write_response(serde_json::to_value(&result)?),
        Err(err) => {
            report_query_error(&err)?;
            Err(CliError::query_failed(err.to_string()))
        }
    }
}

/// Print the table names known to the catalog
pub fn tables(config_path: &Path) -> CliResult<()> {
    let engine = open_engine(config_path)?;
    write_response(json!({ "tables": engine.list_tables() }))
}

/// Print the columns of a table
pub fn schema(config_path: &Path, table: &str) -> CliResult<()> {
    let engine = open_engine(config_path)?;
    let rt = runtime()?;

    let columns = rt.block_on(engine.get_schema(table));
    write_response(json!({ "table": table, "columns": columns }))
}

/// Print the plan for a query without running it
pub fn explain(config_path: &Path, sql: &str) -> CliResult<()> {
    let engine = open_engine(config_path)?;
    write_response(serde_json::to_value(engine.explain(sql))?)
}

/// Answer queries read from stdin until end of input.
///
/// Failed queries are reported and the loop continues. `.clear` empties
/// the table cache and `.stats` prints cache contents and metrics.
pub fn shell(config_path: &Path) -> CliResult<()> {
    let engine = open_engine(config_path)?;
    let rt = runtime()?;
    log_event(Event::ShellStart);

    let mut answered = 0u64;
    for line in read_lines() {
        let line = line?;
        match line.as_str() {
            ".clear" => {
                engine.clear_cache();
                write_response(json!({ "cleared": true }))?;
            }
            ".stats" => {
                write_response(json!({
                    "cache": engine.cache_stats(),
                    "metrics": engine.metrics(),
                }))?;
            }
            sql => match rt.block_on(engine.execute_with_stats(sql)) {
                Ok(result) => write_response(serde_json::to_value(&result)?)?,
                Err(err) => report_query_error(&err)?,
            },
        }
        answered += 1;
    }

    log_event_with_fields(Event::ShellStop, &[("lines", answered.to_string().as_str())]);
    Ok(())
}

fn open_engine(config_path: &Path) -> CliResult<CsvEngine> {
    let config = EngineConfig::load(config_path)?;
    Logger::set_min_severity(config.log_severity());
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("data_dir", config.data_dir.as_str()),
            ("where_mode", config.where_mode.as_str()),
        ],
    );

    if !config.data_path().is_dir() {
        return Err(CliError::config_error(format!(
            "data_dir is not a directory: {}",
            config.data_dir
        )));
    }

    let source = config.csv_source();
    Ok(QueryEngine::with_options(
        source.clone(),
        source,
        config.engine_options(),
    ))
}

fn runtime() -> CliResult<Runtime> {
    Runtime::new().map_err(|e| CliError::io_error(format!("Failed to create tokio runtime: {}", e)))
}

fn report_query_error(err: &QueryError) -> CliResult<()> {
    write_error(err.code().code(), err.message())
}
