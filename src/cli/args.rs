//! CLI argument definitions using clap
//!
//! Commands:
//! - tabquery query <SQL> --config <path>
//! - tabquery tables --config <path>
//! - tabquery schema <TABLE> --config <path>
//! - tabquery explain <SQL> --config <path>
//! - tabquery shell --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tabquery - SQL-style queries over tables of records
#[derive(Parser, Debug)]
#[command(name = "tabquery")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute a single query and exit
    Query {
        /// Query text, e.g. "SELECT * FROM products LIMIT 5"
        sql: String,

        /// Path to configuration file
        #[arg(long, default_value = "./tabquery.json")]
        config: PathBuf,
    },

    /// List known tables
    Tables {
        /// Path to configuration file
        #[arg(long, default_value = "./tabquery.json")]
        config: PathBuf,
    },

    /// Show the columns of a table
    Schema {
        /// Table name
        table: String,

        /// Path to configuration file
        #[arg(long, default_value = "./tabquery.json")]
        config: PathBuf,
    },

    /// Show how a query would run without executing it
    Explain {
        /// Query text
        sql: String,

        /// Path to configuration file
        #[arg(long, default_value = "./tabquery.json")]
        config: PathBuf,
    },

    /// Read one query per line from stdin, answering each on stdout
    Shell {
        /// Path to configuration file
        #[arg(long, default_value = "./tabquery.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
