//! Bind parameters and result rows.
//!
//! The control tables only need text, integers, booleans and timestamps, so
//! [`Value`] covers exactly those plus `NULL`.

use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};
use std::fmt;

/// A bind parameter or a column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Text value
    Text(String),
    /// 64-bit integer
    Integer(i64),
    /// Boolean
    Boolean(bool),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Returns `true` for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::Timestamp(_) => "timestamp",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Text(s) => write!(f, "{s}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One result row with its column names
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row; `columns` and `values` are matched by position
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Column names in select order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in select order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Look up a column by name (exact match first, then ASCII case-insensitive)
    pub fn get(&self, column: &str) -> DbResult<&Value> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .or_else(|| {
                self.columns
                    .iter()
                    .position(|c| c.eq_ignore_ascii_case(column))
            })
            .ok_or_else(|| DbError::ColumnNotFound(column.to_string()))?;
        self.values
            .get(idx)
            .ok_or_else(|| DbError::ColumnNotFound(column.to_string()))
    }

    /// Read a non-null text column
    pub fn text(&self, column: &str) -> DbResult<String> {
        match self.get(column)? {
            Value::Text(s) => Ok(s.clone()),
            other => Err(conversion(column, "text", other)),
        }
    }

    /// Read a nullable text column
    pub fn optional_text(&self, column: &str) -> DbResult<Option<String>> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::Text(s) => Ok(Some(s.clone())),
            other => Err(conversion(column, "text", other)),
        }
    }

    /// Read a non-null integer column; booleans read as 0/1
    pub fn integer(&self, column: &str) -> DbResult<i64> {
        match self.get(column)? {
            Value::Integer(n) => Ok(*n),
            Value::Boolean(b) => Ok(i64::from(*b)),
            other => Err(conversion(column, "integer", other)),
        }
    }

    /// Read a 0/1 flag column: `1` or `true` is set, anything else is not
    pub fn flag(&self, column: &str) -> DbResult<bool> {
        Ok(matches!(
            self.get(column)?,
            Value::Integer(1) | Value::Boolean(true)
        ))
    }

    /// Read a nullable timestamp column
    pub fn optional_timestamp(&self, column: &str) -> DbResult<Option<DateTime<Utc>>> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::Timestamp(ts) => Ok(Some(*ts)),
            other => Err(conversion(column, "timestamp", other)),
        }
    }
}

fn conversion(column: &str, expected: &'static str, found: &Value) -> DbError {
    DbError::ValueConversion {
        column: column.to_string(),
        expected,
        found: format!("{} ({})", found, found.kind()),
    }
}

/// Outcome of a single statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Rows returned by a query; empty for DDL/DML
    pub rows: Vec<Row>,

    /// Rows changed by DML; zero for queries and DDL
    pub rows_affected: usize,

    /// Row id of the last insert, when the backend reports one
    pub insert_id: Option<i64>,
}

impl ResultSet {
    /// Result of a query
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// Result of a statement that changed `rows_affected` rows
    pub fn affected(rows_affected: usize) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }

    /// First row, if any
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Returns `true` when no rows were returned
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
#[path = "value_test.rs"]
mod tests;
