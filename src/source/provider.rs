//! Traits the engine uses to reach table data

use std::future::Future;
use std::sync::Arc;

use crate::value::Record;

use super::errors::SourceResult;

/// Supplies the rows of a named table.
///
/// Implementations may be called concurrently for different tables. The
/// engine caches successful fetches, so a provider is asked for a given
/// table at most once between cache clears unless fetches race.
pub trait TableProvider: Send + Sync {
    /// Load every row of `table`, in source order
    fn fetch_table(&self, table: &str) -> impl Future<Output = SourceResult<Vec<Record>>> + Send;
}

/// Knows which table names exist
pub trait TableCatalog: Send + Sync {
    /// Known table names, in a stable order
    fn table_names(&self) -> Vec<String>;
}

impl<T: TableProvider> TableProvider for Arc<T> {
    fn fetch_table(&self, table: &str) -> impl Future<Output = SourceResult<Vec<Record>>> + Send {
        (**self).fetch_table(table)
    }
}

impl<T: TableCatalog> TableCatalog for Arc<T> {
    fn table_names(&self) -> Vec<String> {
        (**self).table_names()
    }
}

/// A fixed list of table names
impl TableCatalog for Vec<String> {
    fn table_names(&self) -> Vec<String> {
        self.clone()
    }
}
