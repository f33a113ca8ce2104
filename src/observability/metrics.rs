//! Metrics registry for tabquery
//!
//! - Counters only, monotonic
//! - One registry per engine instance
//! - Thread-safe but lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Metrics registry containing query counters
///
/// All counters use Relaxed atomics; a snapshot taken while queries are in
/// flight may mix values from before and after a query.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Successful query count
    queries_executed: AtomicU64,
    /// Rejected query count
    queries_rejected: AtomicU64,
    /// Table lookups answered by the cache
    cache_hits: AtomicU64,
    /// Table lookups that went to the provider
    cache_misses: AtomicU64,
    /// Successful provider fetches
    table_fetches: AtomicU64,
    /// Rows returned across all successful queries
    rows_returned: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Query metrics

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Add to the returned row total
    pub fn add_rows_returned(&self, rows: u64) {
        self.rows_returned.fetch_add(rows, Ordering::Relaxed);
    }

    // Table metrics

    pub fn increment_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cache_misses(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_table_fetches(&self) {
        self.table_fetches.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of successful provider fetches
    pub fn table_fetches(&self) -> u64 {
        self.table_fetches.load(Ordering::Relaxed)
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            table_fetches: self.table_fetches.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub table_fetches: u64,
    pub rows_returned: u64,
}
