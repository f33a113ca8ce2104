//! LIMIT and column projection

use crate::value::Record;

/// Keeps the first `limit` rows. Limits past the row count keep everything.
///
/// Returns whether any rows were dropped.
pub fn apply_limit(rows: &mut Vec<Record>, limit: u64) -> bool {
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    let applied = rows.len() > limit;
    rows.truncate(limit);
    applied
}

/// Keeps only the requested columns that exist on each row, in requested
/// order. Requested columns missing from a row are omitted, not Null.
pub fn project(rows: &[Record], columns: &[String]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            let mut out = Record::with_capacity(columns.len());
            for column in columns {
                if let Some(value) = row.get(column) {
                    out.insert(column.clone(), value.clone());
                }
            }
            out
        })
        .collect()
}
