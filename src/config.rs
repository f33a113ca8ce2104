//! Configuration file loading
//!
//! ```json
//! {
//!   "data_dir": "./data",
//!   "where_mode": "compat",
//!   "delimiter": ",",
//!   "log_level": "info"
//! }
//! ```
//!
//! Only `data_dir` is required.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::cli::{CliError, CliResult};
use crate::engine::EngineOptions;
use crate::executor::WhereMode;
use crate::observability::Severity;
use crate::source::CsvDirectory;

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory of `<table>.csv` files (required)
    pub data_dir: String,

    /// WHERE connective handling (optional, default "compat")
    #[serde(default)]
    pub where_mode: WhereMode,

    /// CSV field delimiter (optional, detected per file when absent)
    #[serde(default)]
    pub delimiter: Option<char>,

    /// Minimum log level (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl EngineConfig {
    /// Config with defaults for everything but the data directory
    pub fn new(data_dir: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            where_mode: WhereMode::default(),
            delimiter: None,
            log_level: default_log_level(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        Self::from_json_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_json_str(content: &str) -> CliResult<Self> {
        let config: EngineConfig = serde_json::from_str(content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        if let Some(delimiter) = self.delimiter {
            if !delimiter.is_ascii() || delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
                return Err(CliError::config_error(format!(
                    "Invalid delimiter: {:?}. Use a single ASCII character other than a quote or newline.",
                    delimiter
                )));
            }
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected trace, info, warn or error.",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn data_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Configured log level; INFO if unparseable
    pub fn log_severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            where_mode: self.where_mode,
        }
    }

    /// CSV source over `data_dir`
    pub fn csv_source(&self) -> CsvDirectory {
        let source = CsvDirectory::new(self.data_path());
        match self.delimiter {
            Some(delimiter) => source.with_delimiter(delimiter as u8),
            None => source,
        }
    }
}
