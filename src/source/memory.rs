//! In-memory table source

use std::collections::BTreeMap;
use std::future::{self, Future};
use std::sync::RwLock;

use crate::value::Record;

use super::errors::{SourceError, SourceResult};
use super::provider::{TableCatalog, TableProvider};

/// Tables held in memory, keyed by name.
///
/// Acts as both provider and catalog. Tables can be added or replaced
/// while an engine is using the source; engines keep serving their cached
/// copy until their cache is cleared.
#[derive(Debug, Default)]
pub struct MemoryTables {
    tables: RwLock<BTreeMap<String, Vec<Record>>>,
}

impl MemoryTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `insert`
    pub fn with_table(self, name: impl Into<String>, rows: Vec<Record>) -> Self {
        self.insert(name, rows);
        self
    }

    /// Add or replace a table
    pub fn insert(&self, name: impl Into<String>, rows: Vec<Record>) {
        if let Ok(mut tables) = self.tables.write() {
            tables.insert(name.into(), rows);
        }
    }

    /// Add or replace a table from a JSON array of objects
    pub fn insert_json(&self, name: impl Into<String>, json: &serde_json::Value) -> SourceResult<()> {
        let name = name.into();
        let items = json
            .as_array()
            .ok_or_else(|| SourceError::InvalidData(format!("table '{}' is not a JSON array", name)))?;

        let rows = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Record::from_json(item).ok_or_else(|| {
                    SourceError::InvalidData(format!("row {} of table '{}' is not an object", i, name))
                })
            })
            .collect::<SourceResult<Vec<_>>>()?;

        self.insert(name, rows);
        Ok(())
    }

    /// Load several tables from a JSON object mapping names to row arrays
    pub fn from_json(json: &serde_json::Value) -> SourceResult<Self> {
        let tables = json
            .as_object()
            .ok_or_else(|| SourceError::InvalidData("expected an object of tables".into()))?;

        let source = Self::new();
        for (name, rows) in tables {
            source.insert_json(name.as_str(), rows)?;
        }
        Ok(source)
    }

    /// Remove a table, returning whether it existed
    pub fn remove(&self, name: &str) -> bool {
        self.tables
            .write()
            .map(|mut tables| tables.remove(name).is_some())
            .unwrap_or(false)
    }

    fn lookup(&self, name: &str) -> SourceResult<Vec<Record>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| SourceError::Internal("Lock poisoned".into()))?;

        tables
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::UnknownTable(name.to_string()))
    }
}

impl TableProvider for MemoryTables {
    fn fetch_table(&self, table: &str) -> impl Future<Output = SourceResult<Vec<Record>>> + Send {
        future::ready(self.lookup(table))
    }
}

impl TableCatalog for MemoryTables {
    fn table_names(&self) -> Vec<String> {
        self.tables
            .read()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    }
}
