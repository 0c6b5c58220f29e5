//! Bound parameter values.
//!
//! Every runtime value that ends up in a statement travels as a `SqlValue`
//! next to the statement text, never inside it.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A value bound to a positional placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SqlValue {
    Int(i64),
    Text(String),
    IntArray(Vec<i64>),
    TextArray(Vec<String>),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl SqlValue {
    /// PostgreSQL type name of the value, used when logging statement shapes.
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Int(_) => "bigint",
            SqlValue::Text(_) => "text",
            SqlValue::IntArray(_) => "bigint[]",
            SqlValue::TextArray(_) => "text[]",
            SqlValue::Date(_) => "date",
            SqlValue::Timestamp(_) => "timestamp",
        }
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Int(n) => write!(f, "{}", n),
            SqlValue::Text(s) => write!(f, "{:?}", s),
            SqlValue::IntArray(values) => {
                let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{{{}}}", items.join(","))
            }
            SqlValue::TextArray(values) => {
                let items: Vec<String> = values.iter().map(|v| format!("{:?}", v)).collect();
                write!(f, "{{{}}}", items.join(","))
            }
            SqlValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            SqlValue::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<Vec<i64>> for SqlValue {
    fn from(values: Vec<i64>) -> Self {
        SqlValue::IntArray(values)
    }
}

impl From<Vec<String>> for SqlValue {
    fn from(values: Vec<String>) -> Self {
        SqlValue::TextArray(values)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(d: NaiveDate) -> Self {
        SqlValue::Date(d)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(ts: NaiveDateTime) -> Self {
        SqlValue::Timestamp(ts)
    }
}
