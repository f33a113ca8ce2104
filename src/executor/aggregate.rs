//! GROUP BY and aggregate functions
//!
//! Rows are partitioned by the text form of their GROUP BY columns. Groups
//! keep the order in which their key was first seen. Each output row has
//! exactly the selected expressions as columns, keyed by their written text.
//!
//! Plain columns that are not in the GROUP BY list take the value from the
//! first row of the group.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::planner::{QueryError, QueryResult};
use crate::value::{Record, Value};

/// Supported aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    /// Parses a function name in any case
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "COUNT" => Some(AggregateFunction::Count),
            "SUM" => Some(AggregateFunction::Sum),
            "AVG" => Some(AggregateFunction::Avg),
            "MIN" => Some(AggregateFunction::Min),
            "MAX" => Some(AggregateFunction::Max),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }
}

/// Aggregate argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateArg {
    /// `*`, COUNT only
    AllRows,
    Column(String),
}

/// One parsed SELECT expression in a grouped query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectItem {
    /// `*`: every column of the group's first row
    Wildcard,
    /// A plain column
    Column(String),
    /// `FN(arg)`, labelled by its written text
    Aggregate {
        function: AggregateFunction,
        arg: AggregateArg,
        label: String,
    },
}

fn aggregate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*\(\s*([^()\s]+)\s*\)$")
            .expect("aggregate pattern is a valid regex")
    })
}

impl SelectItem {
    /// Parses one SELECT expression.
    ///
    /// Anything containing a parenthesis must have the shape `FN(column)`
    /// or `FN(*)`.
    pub fn parse(expr: &str) -> QueryResult<Self> {
        let expr = expr.trim();
        if expr == "*" {
            return Ok(SelectItem::Wildcard);
        }
        if !expr.contains('(') && !expr.contains(')') {
            return Ok(SelectItem::Column(expr.to_string()));
        }

        let caps = aggregate_pattern().captures(expr).ok_or_else(|| {
            QueryError::invalid_syntax(format!(
                "Invalid aggregate expression '{}' (expected FN(column))",
                expr
            ))
        })?;

        let name = &caps[1];
        let function = AggregateFunction::parse(name)
            .ok_or_else(|| QueryError::unsupported_aggregation(name))?;

        let arg = match &caps[2] {
            "*" if function == AggregateFunction::Count => AggregateArg::AllRows,
            "*" => {
                return Err(QueryError::invalid_syntax(format!(
                    "{}(*) is not supported, only COUNT(*)",
                    function.as_str()
                )))
            }
            column => AggregateArg::Column(column.to_string()),
        };

        Ok(SelectItem::Aggregate {
            function,
            arg,
            label: expr.to_string(),
        })
    }
}

/// Group key part. Null is kept apart from any real text, including "NULL".
type KeyPart = Option<String>;

/// Partitions rows and computes aggregates
pub struct Aggregator;

impl Aggregator {
    /// Groups `rows` by `group_by` and evaluates `select_columns` per group.
    ///
    /// Output row count equals the number of distinct group keys.
    pub fn group_and_aggregate(
        rows: &[Record],
        select_columns: &[String],
        group_by: &[String],
    ) -> QueryResult<Vec<Record>> {
        let items = select_columns
            .iter()
            .map(|c| SelectItem::parse(c))
            .collect::<QueryResult<Vec<_>>>()?;

        let groups = Self::partition(rows, group_by);

        Ok(groups
            .iter()
            .map(|group| Self::evaluate_group(group, &items))
            .collect())
    }

    /// Insertion-ordered grouping
    fn partition<'a>(rows: &'a [Record], group_by: &[String]) -> Vec<Vec<&'a Record>> {
        let mut index: HashMap<Vec<KeyPart>, usize> = HashMap::new();
        let mut groups: Vec<Vec<&Record>> = Vec::new();

        for row in rows {
            let key: Vec<KeyPart> = group_by
                .iter()
                .map(|column| row.get_or_null(column).text_form())
                .collect();

            match index.get(&key) {
                Some(&slot) => groups[slot].push(row),
                None => {
                    index.insert(key, groups.len());
                    groups.push(vec![row]);
                }
            }
        }

        groups
    }

    fn evaluate_group(group: &[&Record], items: &[SelectItem]) -> Record {
        let mut out = Record::with_capacity(items.len());
        let first = group[0];

        for item in items {
            match item {
                SelectItem::Wildcard => {
                    for (column, value) in first.iter() {
                        out.insert(column, value.clone());
                    }
                }
                SelectItem::Column(column) => {
                    out.insert(column.clone(), first.get_or_null(column).clone());
                }
                SelectItem::Aggregate {
                    function,
                    arg,
                    label,
                } => {
                    out.insert(label.clone(), Self::compute(*function, arg, group));
                }
            }
        }

        out
    }

    /// Evaluates one aggregate over a group.
    ///
    /// Nulls and missing cells are skipped. An aggregate with nothing left
    /// to aggregate is Null, except COUNT which is 0.
    fn compute(function: AggregateFunction, arg: &AggregateArg, group: &[&Record]) -> Value {
        let column = match arg {
            AggregateArg::AllRows => return Value::Number(group.len() as f64),
            AggregateArg::Column(column) => column,
        };

        let values: Vec<f64> = group
            .iter()
            .map(|row| row.get_or_null(column))
            .filter(|v| !v.is_null())
            .map(Value::to_number)
            .collect();

        if values.is_empty() && function != AggregateFunction::Count {
            return Value::Null;
        }

        let sum: f64 = values.iter().sum();
        let result = match function {
            AggregateFunction::Count => values.len() as f64,
            AggregateFunction::Sum => sum,
            AggregateFunction::Avg => sum / values.len() as f64,
            AggregateFunction::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            AggregateFunction::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        };
        Value::Number(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::QueryErrorCode;

    fn product(category: Value, price: Value, name: &str) -> Record {
        Record::new()
            .with("categoryID", category)
            .with("unitPrice", price)
            .with("productName", name)
    }

    fn cols(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_select_items() {
        assert_eq!(SelectItem::parse("*").unwrap(), SelectItem::Wildcard);
        assert_eq!(
            SelectItem::parse("categoryID").unwrap(),
            SelectItem::Column("categoryID".into())
        );
        assert_eq!(
            SelectItem::parse("count(*)").unwrap(),
            SelectItem::Aggregate {
                function: AggregateFunction::Count,
                arg: AggregateArg::AllRows,
                label: "count(*)".into(),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        let err = SelectItem::parse("FOO(unitPrice)").unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::UnsupportedAggregation);

        let err = SelectItem::parse("SUM(a b)").unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::InvalidSyntax);

        let err = SelectItem::parse("SUM(*)").unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::InvalidSyntax);

        let err = SelectItem::parse("SUM(").unwrap_err();
        assert_eq!(err.code(), QueryErrorCode::InvalidSyntax);
    }

    #[test]
    fn test_aggregates_over_group() {
        let rows = vec![
            product(Value::Number(1.0), Value::Number(18.0), "Chai"),
            product(Value::Number(1.0), Value::Number(19.0), "Chang"),
        ];
        let out = Aggregator::group_and_aggregate(
            &rows,
            &cols(&[
                "categoryID",
                "COUNT(unitPrice)",
                "SUM(unitPrice)",
                "AVG(unitPrice)",
                "MIN(unitPrice)",
                "MAX(unitPrice)",
            ]),
            &cols(&["categoryID"]),
        )
        .unwrap();

        assert_eq!(out.len(), 1);
        let row = &out[0];
        assert_eq!(row.get("COUNT(unitPrice)"), Some(&Value::Number(2.0)));
        assert_eq!(row.get("SUM(unitPrice)"), Some(&Value::Number(37.0)));
        assert_eq!(row.get("AVG(unitPrice)"), Some(&Value::Number(18.5)));
        assert_eq!(row.get("MIN(unitPrice)"), Some(&Value::Number(18.0)));
        assert_eq!(row.get("MAX(unitPrice)"), Some(&Value::Number(19.0)));
    }

    #[test]
    fn test_all_null_column() {
        let rows = vec![
            product(Value::Number(1.0), Value::Null, "a"),
            product(Value::Number(1.0), Value::Null, "b"),
        ];
        let out = Aggregator::group_and_aggregate(
            &rows,
            &cols(&["SUM(unitPrice)", "AVG(unitPrice)", "MIN(unitPrice)", "MAX(unitPrice)", "COUNT(unitPrice)", "COUNT(*)"]),
            &cols(&["categoryID"]),
        )
        .unwrap();

        let row = &out[0];
        assert!(row.get_or_null("SUM(unitPrice)").is_null());
        assert!(row.get_or_null("AVG(unitPrice)").is_null());
        assert!(row.get_or_null("MIN(unitPrice)").is_null());
        assert!(row.get_or_null("MAX(unitPrice)").is_null());
        assert_eq!(row.get("COUNT(unitPrice)"), Some(&Value::Number(0.0)));
        assert_eq!(row.get("COUNT(*)"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let rows = vec![
            product(Value::Number(2.0), Value::Number(1.0), "a"),
            product(Value::Number(1.0), Value::Number(1.0), "b"),
            product(Value::Number(2.0), Value::Number(1.0), "c"),
            product(Value::Number(3.0), Value::Number(1.0), "d"),
        ];
        let out = Aggregator::group_and_aggregate(
            &rows,
            &cols(&["categoryID", "COUNT(*)"]),
            &cols(&["categoryID"]),
        )
        .unwrap();

        let keys: Vec<String> = out.iter().map(|r| r.get_or_null("categoryID").to_string()).collect();
        assert_eq!(keys, vec!["2", "1", "3"]);
        assert_eq!(out[0].get("COUNT(*)"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_null_key_distinct_from_null_text() {
        let rows = vec![
            product(Value::Null, Value::Number(1.0), "a"),
            product(Value::from("NULL"), Value::Number(1.0), "b"),
            product(Value::Null, Value::Number(1.0), "c"),
        ];
        let out = Aggregator::group_and_aggregate(
            &rows,
            &cols(&["categoryID", "COUNT(*)"]),
            &cols(&["categoryID"]),
        )
        .unwrap();

        assert_eq!(out.len(), 2);
        assert!(out[0].get_or_null("categoryID").is_null());
        assert_eq!(out[0].get("COUNT(*)"), Some(&Value::Number(2.0)));
        assert_eq!(out[1].get("categoryID"), Some(&Value::from("NULL")));
    }

    #[test]
    fn test_plain_column_takes_first_row() {
        // Non-grouped plain columns are not an error: the group's first row wins
        let rows = vec![
            product(Value::Number(1.0), Value::Number(18.0), "Chai"),
            product(Value::Number(1.0), Value::Number(19.0), "Chang"),
        ];
        let out = Aggregator::group_and_aggregate(
            &rows,
            &cols(&["productName", "categoryID"]),
            &cols(&["categoryID"]),
        )
        .unwrap();

        assert_eq!(out[0].get("productName"), Some(&Value::from("Chai")));
        let columns: Vec<&str> = out[0].columns().collect();
        assert_eq!(columns, vec!["productName", "categoryID"]);
    }

    #[test]
    fn test_non_numeric_values_count_as_zero() {
        let rows = vec![
            product(Value::Number(1.0), Value::from("abc"), "a"),
            product(Value::Number(1.0), Value::from("4"), "b"),
        ];
        let out = Aggregator::group_and_aggregate(
            &rows,
            &cols(&["SUM(unitPrice)", "MIN(unitPrice)"]),
            &cols(&["categoryID"]),
        )
        .unwrap();

        assert_eq!(out[0].get("SUM(unitPrice)"), Some(&Value::Number(4.0)));
        assert_eq!(out[0].get("MIN(unitPrice)"), Some(&Value::Number(0.0)));
    }

    #[test]
    fn test_infinity_text_counts_as_zero() {
        let rows = vec![
            product(Value::Number(1.0), Value::from("inf"), "a"),
            product(Value::Number(1.0), Value::from("Infinity"), "b"),
            product(Value::Number(1.0), Value::Number(5.0), "c"),
        ];
        let out = Aggregator::group_and_aggregate(
            &rows,
            &cols(&["SUM(unitPrice)", "MAX(unitPrice)", "AVG(unitPrice)"]),
            &cols(&["categoryID"]),
        )
        .unwrap();

        assert_eq!(out[0].get("SUM(unitPrice)"), Some(&Value::Number(5.0)));
        assert_eq!(out[0].get("MAX(unitPrice)"), Some(&Value::Number(5.0)));
        assert_eq!(out[0].get("AVG(unitPrice)"), Some(&Value::Number(5.0 / 3.0)));
    }

    #[test]
    fn test_missing_column_in_output_is_null() {
        let rows = vec![product(Value::Number(1.0), Value::Number(1.0), "a")];
        let out = Aggregator::group_and_aggregate(
            &rows,
            &cols(&["supplier"]),
            &cols(&["categoryID"]),
        )
        .unwrap();
        assert!(out[0].get("supplier").unwrap().is_null());
    }
}
