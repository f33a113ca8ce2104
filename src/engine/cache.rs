//! Per-engine table cache
//!
//! Maps table names to the rows fetched for them. Entries live until
//! `clear` is called; there is no eviction.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::value::Record;

/// Cache contents summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cached tables
    pub size: usize,
    /// Cached table names, sorted
    pub tables: Vec<String>,
}

/// Table rows keyed by table name
#[derive(Debug, Default)]
pub struct TableCache {
    tables: RwLock<HashMap<String, Arc<Vec<Record>>>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached rows of a table
    pub fn get(&self, table: &str) -> Option<Arc<Vec<Record>>> {
        self.tables
            .read()
            .ok()
            .and_then(|tables| tables.get(table).cloned())
    }

    /// Cache rows for a table.
    ///
    /// If another caller cached the table first, its rows are kept and
    /// returned so every query sees a single copy.
    pub fn insert(&self, table: &str, rows: Vec<Record>) -> Arc<Vec<Record>> {
        match self.tables.write() {
            Ok(mut tables) => tables
                .entry(table.to_string())
                .or_insert_with(|| Arc::new(rows))
                .clone(),
            Err(_) => Arc::new(rows),
        }
    }

    /// Drop every entry, returning how many were dropped
    pub fn clear(&self) -> usize {
        self.tables
            .write()
            .map(|mut tables| {
                let dropped = tables.len();
                tables.clear();
                dropped
            })
            .unwrap_or_default()
    }

    /// Number of cached tables
    pub fn len(&self) -> usize {
        self.tables.read().map(|t| t.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached table names, sorted
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tables
            .read()
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn stats(&self) -> CacheStats {
        let tables = self.table_names();
        CacheStats {
            size: tables.len(),
            tables,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<Record> {
        (0..n).map(|i| Record::new().with("id", i as f64)).collect()
    }

    #[test]
    fn test_insert_and_get() {
        let cache = TableCache::new();
        assert!(cache.get("products").is_none());

        cache.insert("products", rows(3));
        assert_eq!(cache.get("products").map(|r| r.len()), Some(3));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_first_insert_wins() {
        let cache = TableCache::new();
        let first = cache.insert("products", rows(3));
        let second = cache.insert("products", rows(5));

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.len(), 3);
    }

    #[test]
    fn test_clear() {
        let cache = TableCache::new();
        cache.insert("a", rows(1));
        cache.insert("b", rows(1));

        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
        assert_eq!(cache.clear(), 0);
    }

    #[test]
    fn test_stats_sorted() {
        let cache = TableCache::new();
        cache.insert("orders", rows(1));
        cache.insert("customers", rows(1));

        let stats = cache.stats();
        assert_eq!(stats.size, 2);
        assert_eq!(stats.tables, vec!["customers", "orders"]);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["size"], 2);
    }
}
