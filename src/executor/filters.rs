//! WHERE clause evaluation
//!
//! The WHERE text is split on ` and ` / ` or ` (any case, whitespace on both
//! sides, never inside quotes). Each piece becomes one `Predicate`.
//!
//! In `WhereMode::Compat` every piece must hold, whatever connective joined
//! it: `a = 1 OR b = 2` behaves like `a = 1 AND b = 2`. This mirrors the
//! behavior existing queries were written against and is almost certainly
//! not what an OR author meant. `WhereMode::Strict` gives AND precedence
//! over OR instead.

use serde::{Deserialize, Serialize};

use crate::planner::find_keyword;
use crate::value::{Record, Value};

/// How connectives between WHERE conditions are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhereMode {
    /// Every connective is treated as AND
    #[default]
    Compat,
    /// AND binds tighter than OR
    Strict,
}

impl WhereMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WhereMode::Compat => "compat",
            WhereMode::Strict => "strict",
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
    /// Case-insensitive substring, `%` wildcards at the ends ignored
    Like,
    /// Case-insensitive substring
    Contains,
}

/// Symbolic operators in match order. Operators that contain another
/// operator's text come first.
const SYMBOLIC_OPS: [(&str, CompareOp); 6] = [
    ("!=", CompareOp::NotEq),
    (">=", CompareOp::Gte),
    ("<=", CompareOp::Lte),
    ("=", CompareOp::Eq),
    (">", CompareOp::Gt),
    ("<", CompareOp::Lt),
];

/// Word operators, tried after every symbolic operator
const WORD_OPS: [(&str, CompareOp); 2] = [("like", CompareOp::Like), ("contains", CompareOp::Contains)];

impl CompareOp {
    /// Returns the operator as written in queries
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Gte => ">=",
            CompareOp::Lte => "<=",
            CompareOp::Like => "like",
            CompareOp::Contains => "contains",
        }
    }

    /// Returns true for operators that coerce both sides to numbers
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            CompareOp::Gt | CompareOp::Lt | CompareOp::Gte | CompareOp::Lte
        )
    }
}

/// Connective between two conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// A single `<column> <op> <literal>` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Column name
    pub column: String,
    /// Comparison operator
    pub op: CompareOp,
    /// Literal with surrounding quotes removed
    pub literal: String,
}

impl Predicate {
    /// Parses one condition. Returns None when no operator is present.
    pub fn parse(condition: &str) -> Option<Self> {
        for (symbol, op) in SYMBOLIC_OPS {
            if let Some(pos) = find_unquoted(condition, symbol) {
                return Some(Self::split_at(condition, pos, pos + symbol.len(), op));
            }
        }

        let lower = condition.to_ascii_lowercase();
        for (word, op) in WORD_OPS {
            if let Some(span) = find_keyword(&lower, &[word], 0) {
                return Some(Self::split_at(condition, span.start, span.end, op));
            }
        }

        None
    }

    fn split_at(condition: &str, op_start: usize, op_end: usize, op: CompareOp) -> Self {
        Self {
            column: condition[..op_start].trim().to_string(),
            op,
            literal: strip_quotes(condition[op_end..].trim()).to_string(),
        }
    }

    /// Evaluates the predicate against a record.
    ///
    /// A record without the column never matches.
    pub fn matches(&self, record: &Record) -> bool {
        let value = match record.get(&self.column) {
            Some(v) => v,
            None => return false,
        };

        match self.op {
            CompareOp::Eq => value.loose_eq(&self.literal),
            CompareOp::NotEq => !value.loose_eq(&self.literal),
            CompareOp::Gt => value.to_number() > self.literal_number(),
            CompareOp::Lt => value.to_number() < self.literal_number(),
            CompareOp::Gte => value.to_number() >= self.literal_number(),
            CompareOp::Lte => value.to_number() <= self.literal_number(),
            CompareOp::Like => contains_ci(value, self.literal.trim_matches('%')),
            CompareOp::Contains => contains_ci(value, &self.literal),
        }
    }

    fn literal_number(&self) -> f64 {
        Value::String(self.literal.clone()).to_number()
    }
}

/// Parsed WHERE clause
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    /// One entry per condition; None for a condition with no operator,
    /// which always holds
    pub predicates: Vec<Option<Predicate>>,
    /// `connectives[i]` joins `predicates[i]` and `predicates[i + 1]`
    pub connectives: Vec<Connective>,
}

impl WhereClause {
    /// Parses raw WHERE text
    pub fn parse(text: &str) -> Self {
        let (parts, connectives) = split_connectives(text);
        Self {
            predicates: parts.into_iter().map(Predicate::parse).collect(),
            connectives,
        }
    }

    /// Checks if a record satisfies the clause under the given mode
    pub fn matches(&self, record: &Record, mode: WhereMode) -> bool {
        let holds = |p: &Option<Predicate>| p.as_ref().map_or(true, |p| p.matches(record));

        match mode {
            WhereMode::Compat => self.predicates.iter().all(holds),
            WhereMode::Strict => {
                // OR of AND-groups
                let mut group_ok = true;
                for (i, predicate) in self.predicates.iter().enumerate() {
                    group_ok = group_ok && holds(predicate);
                    let group_ends = match self.connectives.get(i) {
                        Some(Connective::Or) | None => true,
                        Some(Connective::And) => false,
                    };
                    if group_ends {
                        if group_ok {
                            return true;
                        }
                        group_ok = true;
                    }
                }
                false
            }
        }
    }
}

/// Evaluates WHERE clauses over row sets
pub struct PredicateFilter;

impl PredicateFilter {
    /// Returns the rows that satisfy `where_text`, in input order
    pub fn filter(rows: &[Record], where_text: &str, mode: WhereMode) -> Vec<Record> {
        let clause = WhereClause::parse(where_text);
        rows.iter()
            .filter(|row| clause.matches(row, mode))
            .cloned()
            .collect()
    }
}

/// Splits on unquoted ` and ` / ` or `
fn split_connectives(text: &str) -> (Vec<&str>, Vec<Connective>) {
    let lower = text.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    let mut parts = Vec::new();
    let mut connectives = Vec::new();
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;

    'scan: while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        if b == b'\'' || b == b'"' {
            quote = Some(b);
            i += 1;
            continue;
        }
        if i > 0 && bytes[i - 1].is_ascii_whitespace() {
            for (word, connective) in [("and", Connective::And), ("or", Connective::Or)] {
                let end = i + word.len();
                if bytes[i..].starts_with(word.as_bytes())
                    && end < bytes.len()
                    && bytes[end].is_ascii_whitespace()
                {
                    parts.push(text[start..i].trim());
                    connectives.push(connective);
                    start = end;
                    i = end;
                    continue 'scan;
                }
            }
        }
        i += 1;
    }
    parts.push(text[start..].trim());

    (parts, connectives)
}

/// Byte offset of the first unquoted occurrence of `needle`
fn find_unquoted(text: &str, needle: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut quote: Option<u8> = None;

    for i in 0..bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        if b == b'\'' || b == b'"' {
            quote = Some(b);
            continue;
        }
        if bytes[i..].starts_with(needle.as_bytes()) {
            return Some(i);
        }
    }

    None
}

/// Removes one pair of matching surrounding quotes
fn strip_quotes(literal: &str) -> &str {
    let bytes = literal.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'\'' || first == b'"') {
            return &literal[1..literal.len() - 1];
        }
    }
    literal
}

fn contains_ci(value: &Value, needle: &str) -> bool {
    value
        .text_form()
        .map_or(false, |text| text.to_lowercase().contains(&needle.to_lowercase()))
}
