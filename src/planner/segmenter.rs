//! Clause segmentation
//!
//! Turns query text into a `SelectQuery`. Two forms are accepted:
//!
//! 1. A bare table name (case-insensitive match against the catalog)
//! 2. `SELECT <columns> FROM <table> [WHERE ..] [GROUP BY ..] [ORDER BY ..] [LIMIT n]`
//!
//! Each optional clause runs from just after its keyword to the start of
//! the nearest later-priority keyword (WHERE -> GROUP BY -> ORDER BY ->
//! LIMIT -> end of input). Absent clauses contribute no boundary.

use super::ast::{SelectQuery, SortDirection, SortSpec};
use super::errors::{QueryError, QueryResult};
use super::scan::{find_keyword, is_ident_byte, split_top_level, Span};

/// Optional clauses in boundary priority order
const CLAUSES: [(Clause, &[&str]); 4] = [
    (Clause::Where, &["where"]),
    (Clause::GroupBy, &["group", "by"]),
    (Clause::OrderBy, &["order", "by"]),
    (Clause::Limit, &["limit"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clause {
    Where,
    GroupBy,
    OrderBy,
    Limit,
}

impl Clause {
    fn keyword(&self) -> &'static str {
        match self {
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP BY",
            Clause::OrderBy => "ORDER BY",
            Clause::Limit => "LIMIT",
        }
    }
}

/// Splits query text into clauses
pub struct ClauseSegmenter;

impl ClauseSegmenter {
    /// Parses `raw` against the given table names.
    ///
    /// This method is deterministic: same text + same catalog = same query.
    pub fn segment(raw: &str, known_tables: &[String]) -> QueryResult<SelectQuery> {
        let text = raw.trim().trim_end_matches(';').trim_end();
        if text.is_empty() {
            return Err(QueryError::unsupported_query_type(raw));
        }

        // Form 1: bare table name
        let folded = text.to_lowercase();
        if let Some(name) = known_tables.iter().find(|t| t.to_lowercase() == folded) {
            return Ok(SelectQuery::bare(name.clone()));
        }

        // Form 2: SELECT ... FROM ...
        let lower = text.to_ascii_lowercase();
        let select = match find_keyword(&lower, &["select"], 0) {
            Some(span) if span.start == 0 => span,
            _ => return Err(QueryError::unsupported_query_type(text)),
        };

        let from = find_keyword(&lower, &["from"], select.end)
            .ok_or_else(|| QueryError::invalid_syntax("Missing FROM clause"))?;

        let columns = Self::parse_columns(&text[select.end..from.start])?;
        let (table, table_end) = Self::parse_table_name(text, from.end)?;

        let mut query = SelectQuery::select_all(table).with_columns(columns);
        Self::parse_clauses(text, &lower, table_end, &mut query)?;

        Ok(query)
    }

    /// Splits the column list on top-level commas
    fn parse_columns(list: &str) -> QueryResult<Vec<String>> {
        let list = list.trim();
        if list.is_empty() {
            return Err(QueryError::invalid_syntax("SELECT requires at least one column"));
        }

        split_top_level(list)
            .into_iter()
            .map(|column| {
                if column.is_empty() {
                    Err(QueryError::invalid_syntax("Empty column in SELECT list"))
                } else {
                    Ok(column.to_string())
                }
            })
            .collect()
    }

    /// Reads the identifier after FROM, returning it and its end offset
    fn parse_table_name(text: &str, from_end: usize) -> QueryResult<(String, usize)> {
        let bytes = text.as_bytes();
        let mut start = from_end;
        while start < bytes.len() && bytes[start].is_ascii_whitespace() {
            start += 1;
        }
        let mut end = start;
        while end < bytes.len() && is_ident_byte(bytes[end]) {
            end += 1;
        }

        if start == end {
            return Err(QueryError::invalid_syntax("Missing table name after FROM"));
        }
        Ok((text[start..end].to_string(), end))
    }

    /// Locates and parses WHERE / GROUP BY / ORDER BY / LIMIT
    fn parse_clauses(
        text: &str,
        lower: &str,
        table_end: usize,
        query: &mut SelectQuery,
    ) -> QueryResult<()> {
        let found: Vec<(Clause, Option<Span>)> = CLAUSES
            .iter()
            .map(|(clause, words)| (*clause, find_keyword(lower, words, table_end)))
            .collect();

        // Nothing but whitespace may sit between the table name and the first clause
        let first_clause = found
            .iter()
            .filter_map(|(_, span)| span.map(|s| s.start))
            .min()
            .unwrap_or(text.len());
        let stray = text[table_end..first_clause].trim();
        if !stray.is_empty() {
            return Err(if stray.starts_with(',') {
                QueryError::invalid_syntax(format!(
                    "Multi-table FROM is not supported: '{}{}'",
                    query.table, stray
                ))
            } else {
                QueryError::invalid_syntax(format!(
                    "Unexpected text after table name: '{}'",
                    stray
                ))
            });
        }

        for (idx, (clause, span)) in found.iter().enumerate() {
            let Some(span) = span else { continue };

            let end = found[idx + 1..]
                .iter()
                .filter_map(|(_, later)| later.map(|s| s.start))
                .filter(|start| *start > span.start)
                .min()
                .unwrap_or(text.len());

            let body = text[span.end..end].trim();
            if body.is_empty() {
                return Err(QueryError::invalid_syntax(format!(
                    "Empty {} clause",
                    clause.keyword()
                )));
            }

            match clause {
                Clause::Where => query.where_clause = Some(body.to_string()),
                Clause::GroupBy => query.group_by = Some(Self::parse_group_by(body)?),
                Clause::OrderBy => query.order_by = Some(Self::parse_order_by(body)?),
                Clause::Limit => query.limit = Some(Self::parse_limit(body)?),
            }
        }

        Ok(())
    }

    fn parse_group_by(body: &str) -> QueryResult<Vec<String>> {
        body.split(',')
            .map(|column| {
                let column = column.trim();
                if column.is_empty() {
                    Err(QueryError::invalid_syntax("Empty column in GROUP BY"))
                } else {
                    Ok(column.to_string())
                }
            })
            .collect()
    }

    /// Parses `<column> [asc|desc], ...`
    fn parse_order_by(body: &str) -> QueryResult<Vec<SortSpec>> {
        body.split(',')
            .map(|term| {
                let tokens: Vec<&str> = term.split_whitespace().collect();
                match tokens.as_slice() {
                    [column] => Ok(SortSpec::asc(*column)),
                    [column, direction] => {
                        let direction = SortDirection::parse(direction).ok_or_else(|| {
                            QueryError::invalid_syntax(format!(
                                "Invalid sort direction '{}' (expected ASC or DESC)",
                                direction
                            ))
                        })?;
                        Ok(SortSpec {
                            column: column.to_string(),
                            direction,
                        })
                    }
                    [] => Err(QueryError::invalid_syntax("Empty term in ORDER BY")),
                    _ => Err(QueryError::invalid_syntax(format!(
                        "Invalid ORDER BY term '{}'",
                        term.trim()
                    ))),
                }
            })
            .collect()
    }

    /// Integer literals too large for u64 saturate; the limit is clamped to
    /// the row count anyway.
    fn parse_limit(body: &str) -> QueryResult<u64> {
        let digits = body.strip_prefix('+').unwrap_or(body);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(digits.parse::<u64>().unwrap_or(u64::MAX));
        }
        body.parse::<u64>().map_err(|_| {
            QueryError::invalid_syntax(format!(
                "LIMIT must be a non-negative integer, got '{}'",
                body
            ))
        })
    }
}
