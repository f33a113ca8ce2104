//! CSV directory table source.
//!
//! Every `<name>.csv` file directly inside the directory is table `<name>`.
//! The first record is the header. The delimiter is configured or detected
//! from the header line (comma, tab, semicolon or pipe by frequency). Fields may be
//! double-quoted, with `""` standing for a literal quote; quoted fields may
//! span lines. Cells are typed with `Value::from_cell`.

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::observability::Logger;
use crate::value::{Record, Value};

use super::errors::{SourceError, SourceResult};
use super::provider::{TableCatalog, TableProvider};

/// Candidate delimiters in priority order.
const CANDIDATES: &[u8] = b",\t;|";

/// Tables backed by CSV files in one directory
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    root: PathBuf,
    delimiter: Option<u8>,
}

impl CsvDirectory {
    /// Serve the CSV files in `root`, detecting each file's delimiter
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            delimiter: None,
        }
    }

    /// Use a fixed delimiter instead of detecting one
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `table`, or None if the name could escape
    /// the directory
    fn table_path(&self, table: &str) -> Option<PathBuf> {
        is_table_name(table).then(|| self.root.join(format!("{}.csv", table)))
    }
}

/// Table names are limited to `[A-Za-z0-9_-]`
fn is_table_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

impl TableProvider for CsvDirectory {
    fn fetch_table(&self, table: &str) -> impl Future<Output = SourceResult<Vec<Record>>> + Send {
        let path = self.table_path(table);
        let table = table.to_string();
        let delimiter = self.delimiter;

        async move {
            let path = path.ok_or_else(|| SourceError::UnknownTable(table.clone()))?;
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(SourceError::UnknownTable(table));
                }
                Err(e) => return Err(SourceError::from(e)),
            };
            parse_csv(&table, &content, delimiter)
        }
    }
}

impl TableCatalog for CsvDirectory {
    fn table_names(&self) -> Vec<String> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                let root = self.root.display().to_string();
                Logger::warn(
                    "CATALOG_SCAN_FAILED",
                    &[("data_dir", root.as_str()), ("reason", e.to_string().as_str())],
                );
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
            })
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .filter(|name| is_table_name(name))
            .collect();
        names.sort();
        names
    }
}

/// Detect the most likely delimiter in a header line.
///
/// Returns the candidate with the highest count, defaulting to comma.
pub fn detect_delimiter(line: &str) -> u8 {
    let mut best = b',';
    let mut best_count = 0usize;

    for &delim in CANDIDATES {
        let count = line.bytes().filter(|&b| b == delim).count();
        if count > best_count {
            best_count = count;
            best = delim;
        }
    }

    best
}

/// Parse CSV text into records keyed by the header.
///
/// Short rows are padded with Null so every record has every column. Rows
/// with more fields than the header are rejected. Blank lines are skipped.
pub fn parse_csv(table: &str, content: &str, delimiter: Option<u8>) -> SourceResult<Vec<Record>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let delimiter = delimiter.unwrap_or_else(|| {
        detect_delimiter(content.lines().next().unwrap_or_default())
    });

    let mut raw_rows = split_records(table, content, delimiter)?.into_iter();
    let header = match raw_rows.next() {
        Some(row) => header_names(row.fields),
        None => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for row in raw_rows {
        if row.is_blank() {
            continue;
        }
        if row.fields.len() > header.len() {
            return Err(SourceError::Malformed {
                table: table.to_string(),
                line: row.line,
                reason: format!(
                    "expected at most {} fields, found {}",
                    header.len(),
                    row.fields.len()
                ),
            });
        }

        let mut record = Record::with_capacity(header.len());
        let mut cells = row.fields.into_iter();
        for column in &header {
            let value = cells
                .next()
                .map_or(Value::Null, |cell| Value::from_cell(&cell));
            record.insert(column.clone(), value);
        }
        records.push(record);
    }

    Ok(records)
}

/// One physical record before typing
struct RawRow {
    /// 1-based line the record starts on
    line: usize,
    fields: Vec<String>,
}

impl RawRow {
    fn is_blank(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].trim().is_empty()
    }
}

/// Trimmed header names; empty names become `_col_N`, repeats get a suffix
fn header_names(fields: Vec<String>) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(fields.len());
    for (i, field) in fields.into_iter().enumerate() {
        let trimmed = field.trim();
        let mut name = if trimmed.is_empty() {
            format!("_col_{}", i)
        } else {
            trimmed.to_string()
        };
        let mut suffix = 2;
        while names.contains(&name) {
            name = format!("{}_{}", trimmed, suffix);
            suffix += 1;
        }
        names.push(name);
    }
    names
}

fn split_records(table: &str, content: &str, delimiter: u8) -> SourceResult<Vec<RawRow>> {
    let delimiter = delimiter as char;
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut field));
                rows.push(RawRow {
                    line: row_start,
                    fields: std::mem::take(&mut fields),
                });
                line += 1;
                row_start = line;
            }
            c if c == delimiter => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(SourceError::Malformed {
            table: table.to_string(),
            line: row_start,
            reason: "unterminated quoted field".into(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        rows.push(RawRow {
            line: row_start,
            fields,
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(record: &Record) -> Vec<&str> {
        record.columns().collect()
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a,b,c"), b',');
        assert_eq!(detect_delimiter("a\tb\tc"), b'\t');
        assert_eq!(detect_delimiter("a|b|c"), b'|');
        assert_eq!(detect_delimiter("a;b;c"), b';');
        assert_eq!(detect_delimiter("name;price,usd;qty"), b';');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn test_parse_typed_cells() {
        let rows = parse_csv("t", "id,name,price,active\n1,Chai,18.5,true\n2,,3,FALSE\n", None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(columns(&rows[0]), vec!["id", "name", "price", "active"]);
        assert_eq!(rows[0].get("price"), Some(&Value::Number(18.5)));
        assert_eq!(rows[0].get("active"), Some(&Value::Boolean(true)));
        assert_eq!(rows[1].get("name"), Some(&Value::Null));
    }

    #[test]
    fn test_quoted_fields() {
        let content = "name,notes\n\"Smith, John\",\"said \"\"hi\"\"\"\n\"multi\nline\",x\n";
        let rows = parse_csv("t", content, None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name"), Some(&Value::from("Smith, John")));
        assert_eq!(rows[0].get("notes"), Some(&Value::from("said \"hi\"")));
        assert_eq!(rows[1].get("name"), Some(&Value::from("multi\nline")));
    }

    #[test]
    fn test_crlf_and_missing_trailing_newline() {
        let rows = parse_csv("t", "a,b\r\n1,2\r\n3,4", None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("b"), Some(&Value::Number(4.0)));
    }

    #[test]
    fn test_short_rows_padded_blank_lines_skipped() {
        let rows = parse_csv("t", "a,b,c\n1\n\n2,3,4\n", None).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("c"), Some(&Value::Null));
        assert_eq!(rows[0].len(), 3);
    }

    #[test]
    fn test_long_row_rejected() {
        let err = parse_csv("orders", "a,b\n1,2\n1,2,3\n", None).unwrap_err();
        match err {
            SourceError::Malformed { table, line, .. } => {
                assert_eq!(table, "orders");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(matches!(
            parse_csv("t", "a\n\"open\n", None),
            Err(SourceError::Malformed { .. })
        ));
    }

    #[test]
    fn test_header_names() {
        let rows = parse_csv("t", " id , ,id\n1,2,3\n", None).unwrap();
        assert_eq!(columns(&rows[0]), vec!["id", "_col_1", "id_2"]);
    }

    #[test]
    fn test_fixed_delimiter() {
        let rows = parse_csv("t", "a;b\n1;2\n", Some(b';')).unwrap();
        assert_eq!(rows[0].get("b"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_header_only_and_empty() {
        assert!(parse_csv("t", "a,b\n", None).unwrap().is_empty());
        assert!(parse_csv("t", "", None).unwrap().is_empty());
    }

    #[test]
    fn test_table_path_rejects_traversal() {
        let dir = CsvDirectory::new("/data");
        assert!(dir.table_path("../etc/passwd").is_none());
        assert!(dir.table_path("").is_none());
        assert_eq!(dir.table_path("orders"), Some(PathBuf::from("/data/orders.csv")));
        assert!(dir.table_path("order details").is_none());
    }

    #[test]
    fn test_catalog_skips_unservable_names() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("orders.csv"), "id\n1\n").unwrap();
        std::fs::write(dir.path().join("order details.csv"), "id\n1\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let source = CsvDirectory::new(dir.path());
        assert_eq!(source.table_names(), vec!["orders".to_string()]);
    }
}
