//! ORDER BY sorting
//!
//! Multi-key, stable. Values are never coerced for ordering.

use std::cmp::Ordering;

use crate::planner::{SortDirection, SortSpec};
use crate::value::{Record, Value};

/// Sorts result rows
pub struct ResultSorter;

impl ResultSorter {
    /// Sorts rows by each sort key in turn; ties fall through to the next key
    /// and rows equal on every key keep their input order.
    pub fn sort(rows: &mut [Record], specs: &[SortSpec]) {
        rows.sort_by(|a, b| {
            for spec in specs {
                let ordering =
                    Self::compare_values(a.get_or_null(&spec.column), b.get_or_null(&spec.column));
                let ordering = match spec.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    /// Compares two values for sorting.
    ///
    /// Ordering rules:
    /// - null < bool < number < string
    /// - numbers numerically, strings by `collate`
    pub fn compare_values(a: &Value, b: &Value) -> Ordering {
        match (a, b) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
            (Value::String(x), Value::String(y)) => collate(x, y),
            _ => a.type_rank().cmp(&b.type_rank()),
        }
    }
}

/// Locale-style string ordering: case-insensitive first, then lowercase
/// before uppercase for strings that differ only in case.
fn collate(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, a: impl Into<Value>, b: impl Into<Value>) -> Record {
        Record::new().with("id", id).with("a", a).with("b", b)
    }

    fn ids(rows: &[Record]) -> Vec<String> {
        rows.iter().map(|r| r.get_or_null("id").to_string()).collect()
    }

    #[test]
    fn test_sort_ascending_and_descending() {
        let mut rows = vec![row("c", 30.0, 0.0), row("a", 20.0, 0.0), row("b", 25.0, 0.0)];

        ResultSorter::sort(&mut rows, &[SortSpec::asc("a")]);
        assert_eq!(ids(&rows), vec!["a", "b", "c"]);

        ResultSorter::sort(&mut rows, &[SortSpec::desc("a")]);
        assert_eq!(ids(&rows), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_stable() {
        let mut rows = vec![row("x", 1.0, 0.0), row("y", 0.0, 0.0), row("z", 1.0, 0.0)];
        ResultSorter::sort(&mut rows, &[SortSpec::asc("a")]);
        assert_eq!(ids(&rows), vec!["y", "x", "z"]);
    }

    #[test]
    fn test_multi_key() {
        let mut rows = vec![
            row("1", 1.0, 5.0),
            row("2", 0.0, 9.0),
            row("3", 1.0, 7.0),
            row("4", 0.0, 3.0),
        ];
        ResultSorter::sort(&mut rows, &[SortSpec::asc("a"), SortSpec::desc("b")]);
        assert_eq!(ids(&rows), vec!["2", "4", "3", "1"]);
    }

    #[test]
    fn test_strings_case_insensitive() {
        let mut rows = vec![row("1", "banana", 0.0), row("2", "Apple", 0.0), row("3", "cherry", 0.0)];
        ResultSorter::sort(&mut rows, &[SortSpec::asc("a")]);
        assert_eq!(ids(&rows), vec!["2", "1", "3"]);
    }

    #[test]
    fn test_numeric_text_not_coerced() {
        // "10" sorts before "9" as text
        let mut rows = vec![row("1", "9", 0.0), row("2", "10", 0.0)];
        ResultSorter::sort(&mut rows, &[SortSpec::asc("a")]);
        assert_eq!(ids(&rows), vec!["2", "1"]);
    }

    #[test]
    fn test_mixed_types_and_nulls() {
        let mut rows = vec![
            row("s", "x", 0.0),
            row("n", 1.0, 0.0),
            row("null", Value::Null, 0.0),
            row("b", true, 0.0),
        ];
        ResultSorter::sort(&mut rows, &[SortSpec::asc("a")]);
        assert_eq!(ids(&rows), vec!["null", "b", "n", "s"]);

        // Missing column sorts like null
        let mut rows = vec![row("1", 1.0, 0.0), Record::new().with("id", "2")];
        ResultSorter::sort(&mut rows, &[SortSpec::asc("a")]);
        assert_eq!(ids(&rows), vec!["2", "1"]);
    }

    #[test]
    fn test_collate_case_tiebreak() {
        assert_eq!(collate("a", "A"), Ordering::Less);
        assert_eq!(collate("A", "b"), Ordering::Less);
        assert_eq!(collate("same", "same"), Ordering::Equal);
    }
}
