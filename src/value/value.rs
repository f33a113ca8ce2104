//! Scalar values and their coercion rules

use std::fmt;

use serde::{Deserialize, Serialize};

/// A loosely typed scalar cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing or empty
    Null,
    /// true / false
    Boolean(bool),
    /// Any numeric value, stored as f64
    Number(f64),
    /// Raw text
    String(String),
}

impl Value {
    /// Returns true if this is Null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Types a raw text cell the way a table loader does.
    ///
    /// Empty (after trim) becomes Null, numeric text becomes Number,
    /// `true`/`false` becomes Boolean, everything else stays String.
    pub fn from_cell(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if let Some(n) = parse_numeric(trimmed) {
            return Value::Number(n);
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Boolean(false);
        }
        Value::String(raw.to_string())
    }

    /// Strict numeric interpretation, None when the value is not numeric
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => parse_numeric(s.trim()),
            Value::Boolean(_) | Value::Null => None,
        }
    }

    /// Numeric coercion used by comparisons and aggregation.
    ///
    /// Anything that cannot be read as a number becomes 0.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Boolean(true) => 1.0,
            Value::Boolean(false) => 0.0,
            other => other.as_number().unwrap_or(0.0),
        }
    }

    /// Text form used for substring matching and group keys.
    ///
    /// Null has no text form.
    pub fn text_form(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Boolean(b) => Some(b.to_string()),
            Value::Number(n) => Some(format_number(*n)),
            Value::String(s) => Some(s.clone()),
        }
    }

    /// Loose equality against a WHERE literal (quotes already stripped).
    ///
    /// - Number vs literal: numeric comparison if the literal is numeric
    /// - String vs literal: exact text comparison, or numeric comparison
    ///   when both sides are numeric (`"18.0" = 18`)
    /// - Boolean vs literal: `true`/`false` (any case) or `1`/`0`
    /// - Null never equals anything
    pub fn loose_eq(&self, literal: &str) -> bool {
        match self {
            Value::Null => false,
            Value::Number(n) => parse_numeric(literal.trim()).map_or(false, |l| *n == l),
            Value::String(s) => {
                if s == literal {
                    return true;
                }
                match (parse_numeric(s.trim()), parse_numeric(literal.trim())) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                }
            }
            Value::Boolean(b) => {
                let lit = literal.trim();
                if lit.eq_ignore_ascii_case("true") {
                    *b
                } else if lit.eq_ignore_ascii_case("false") {
                    !*b
                } else {
                    parse_numeric(lit).map_or(false, |l| l == if *b { 1.0 } else { 0.0 })
                }
            }
        }
    }

    /// Rank used when ordering values of different types:
    /// Null < Boolean < Number < String
    pub fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            serde_json::Value::String(s) => Value::String(s.clone()),
            // Nested structures are flattened to their JSON text
            other => Value::String(other.to_string()),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Parses numeric text. Only finite values count, so `NaN`, `inf` and
/// `Infinity` stay text.
fn parse_numeric(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => None,
    }
}

/// Integral numbers print without a fractional part (18, not 18.0)
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_cell_typing() {
        assert_eq!(Value::from_cell(""), Value::Null);
        assert_eq!(Value::from_cell("   "), Value::Null);
        assert_eq!(Value::from_cell("18"), Value::Number(18.0));
        assert_eq!(Value::from_cell("18.50"), Value::Number(18.5));
        assert_eq!(Value::from_cell("TRUE"), Value::Boolean(true));
        assert_eq!(Value::from_cell("Chai"), Value::String("Chai".into()));
        // NaN text is not a number
        assert_eq!(Value::from_cell("NaN"), Value::String("NaN".into()));
    }

    #[test]
    fn test_infinity_text_is_not_numeric() {
        assert_eq!(Value::from_cell("Infinity"), Value::String("Infinity".into()));
        assert_eq!(Value::from_cell("INF"), Value::String("INF".into()));
        assert_eq!(Value::from_cell("-inf"), Value::String("-inf".into()));
        assert_eq!(Value::from("inf").to_number(), 0.0);
        assert_eq!(Value::from("inf").as_number(), None);
        assert!(!Value::Number(0.0).loose_eq("inf"));
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(Value::from("42").to_number(), 42.0);
        assert_eq!(Value::from(" 3.5 ").to_number(), 3.5);
        assert_eq!(Value::from("abc").to_number(), 0.0);
        assert_eq!(Value::Null.to_number(), 0.0);
        assert_eq!(Value::Boolean(true).to_number(), 1.0);
    }

    #[test]
    fn test_loose_equality() {
        assert!(Value::Number(18.0).loose_eq("18"));
        assert!(Value::Number(18.0).loose_eq("18.00"));
        assert!(!Value::Number(18.0).loose_eq("abc"));
        assert!(Value::from("Chai").loose_eq("Chai"));
        assert!(!Value::from("Chai").loose_eq("chai"));
        assert!(Value::from("18.0").loose_eq("18"));
        assert!(Value::Boolean(true).loose_eq("TRUE"));
        assert!(Value::Boolean(false).loose_eq("0"));
        assert!(!Value::Null.loose_eq("NULL"));
    }

    #[test]
    fn test_display_and_text_form() {
        assert_eq!(Value::Number(18.0).to_string(), "18");
        assert_eq!(Value::Number(18.5).to_string(), "18.5");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Null.text_form(), None);
        assert_eq!(Value::Number(2.0).text_form(), Some("2".to_string()));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from(&json!(null)), Value::Null);
        assert_eq!(Value::from(&json!(7)), Value::Number(7.0));
        assert_eq!(Value::from(&json!("x")), Value::String("x".into()));
        assert_eq!(Value::from(&json!([1, 2])), Value::String("[1,2]".into()));
    }

    #[test]
    fn test_serializes_untagged() {
        let out = serde_json::to_string(&vec![
            Value::Null,
            Value::Number(1.5),
            Value::from("a"),
            Value::Boolean(false),
        ])
        .unwrap();
        assert_eq!(out, r#"[null,1.5,"a",false]"#);
    }
}
