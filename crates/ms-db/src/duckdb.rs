//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Database, Transaction};
use crate::value::{ResultSet, Row, Value};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use duckdb::types::{TimeUnit, Value as DuckValue};
use duckdb::Connection;
use std::path::Path;
use tokio::sync::{Mutex, MutexGuard};

/// Leading keywords of statements that produce a result set.
const ROW_RETURNING_KEYWORDS: &[&str] = &[
    "SELECT",
    "WITH",
    "VALUES",
    "PRAGMA",
    "SHOW",
    "DESCRIBE",
    "EXPLAIN",
    "SUMMARIZE",
    "FROM",
    "TABLE",
];

/// DuckDB database backend
///
/// Owns a single connection; transaction scopes are serialised on it.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn begin(&self) -> DbResult<Box<dyn Transaction + '_>> {
        let conn = self.conn.lock().await;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;
        log::trace!("duckdb: transaction opened");
        Ok(Box::new(DuckDbTransaction { conn, open: true }))
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Open transaction on a [`DuckDbBackend`] connection
pub struct DuckDbTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    open: bool,
}

impl DuckDbTransaction<'_> {
    fn ensure_open(&self) -> DbResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(DbError::TransactionError(
                "transaction already finished".to_string(),
            ))
        }
    }

    /// Execute one statement synchronously
    fn execute_sync(&self, sql: &str, binds: &[Value]) -> DbResult<ResultSet> {
        self.ensure_open()?;
        let params: Vec<DuckValue> = binds.iter().map(to_duck_value).collect();
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))?;

        if !returns_rows(sql) {
            let affected = stmt
                .execute(duckdb::params_from_iter(params))
                .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))?;
            return Ok(ResultSet::affected(affected));
        }

        // Column metadata is only available once the statement has run, so
        // rows are collected first.
        let raw_rows: Vec<Vec<Value>> = stmt
            .query_map(duckdb::params_from_iter(params), |row| {
                let col_count = row.as_ref().column_count();
                (0..col_count)
                    .map(|i| row.get::<_, DuckValue>(i).map(from_duck_value))
                    .collect()
            })
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::ExecutionError(format!("row error: {e}")))?;

        let column_count = stmt.column_count();
        let columns: Vec<String> = (0..column_count)
            .map(|i| {
                stmt.column_name(i)
                    .map_or("?".to_string(), |v| v.to_string())
            })
            .collect();

        Ok(ResultSet::from_rows(
            raw_rows
                .into_iter()
                .map(|values| Row::new(columns.clone(), values))
                .collect(),
        ))
    }

    /// Check if a table exists synchronously
    fn table_exists_sync(&self, name: &str) -> DbResult<bool> {
        self.ensure_open()?;

        // Handle schema-qualified names
        let (schema, table) = match name.rfind('.') {
            Some(pos) => (&name[..pos], &name[pos + 1..]),
            None => ("main", name),
        };

        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ? AND table_name = ?",
                duckdb::params![schema, table],
                |row| row.get(0),
            )
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;

        Ok(count > 0)
    }

    fn finish(&mut self, statement: &str) -> DbResult<()> {
        self.ensure_open()?;
        self.open = false;
        self.conn
            .execute_batch(statement)
            .map_err(|e| DbError::TransactionError(format!("{statement} failed: {e}")))
    }
}

#[async_trait]
impl Transaction for DuckDbTransaction<'_> {
    async fn table_exists(&mut self, name: &str) -> DbResult<bool> {
        self.table_exists_sync(name)
    }

    async fn execute(&mut self, sql: &str, binds: &[Value]) -> DbResult<ResultSet> {
        self.execute_sync(sql, binds)
    }

    async fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        self.ensure_open()?;
        self.conn.execute_batch(sql).map_err(DbError::from)
    }

    async fn commit(&mut self) -> DbResult<()> {
        if let Err(commit_err) = self.finish("COMMIT") {
            let _ = self.conn.execute_batch("ROLLBACK");
            return Err(commit_err);
        }
        log::trace!("duckdb: transaction committed");
        Ok(())
    }

    async fn rollback(&mut self) -> DbResult<()> {
        self.finish("ROLLBACK")?;
        log::trace!("duckdb: transaction rolled back");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }
}

impl Drop for DuckDbTransaction<'_> {
    fn drop(&mut self) {
        if self.open {
            log::debug!("duckdb: open transaction dropped, rolling back");
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

/// Whether `sql` starts with a keyword that yields rows
fn returns_rows(sql: &str) -> bool {
    let first = sql
        .trim_start_matches(|c: char| c.is_whitespace() || c == '(')
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default();
    ROW_RETURNING_KEYWORDS
        .iter()
        .any(|kw| first.eq_ignore_ascii_case(kw))
}

fn to_duck_value(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Text(s) => DuckValue::Text(s.clone()),
        Value::Integer(n) => DuckValue::BigInt(*n),
        Value::Boolean(b) => DuckValue::Boolean(*b),
        Value::Timestamp(ts) => DuckValue::Timestamp(TimeUnit::Microsecond, ts.timestamp_micros()),
    }
}

fn from_duck_value(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Boolean(b),
        DuckValue::TinyInt(n) => Value::Integer(i64::from(n)),
        DuckValue::SmallInt(n) => Value::Integer(i64::from(n)),
        DuckValue::Int(n) => Value::Integer(i64::from(n)),
        DuckValue::BigInt(n) => Value::Integer(n),
        DuckValue::UTinyInt(n) => Value::Integer(i64::from(n)),
        DuckValue::USmallInt(n) => Value::Integer(i64::from(n)),
        DuckValue::UInt(n) => Value::Integer(i64::from(n)),
        DuckValue::UBigInt(n) => {
            i64::try_from(n).map_or_else(|_| Value::Text(n.to_string()), Value::Integer)
        }
        DuckValue::HugeInt(n) => {
            i64::try_from(n).map_or_else(|_| Value::Text(n.to_string()), Value::Integer)
        }
        DuckValue::Float(f) => Value::Text(f.to_string()),
        DuckValue::Double(f) => Value::Text(f.to_string()),
        DuckValue::Text(s) => Value::Text(s),
        DuckValue::Timestamp(unit, n) => timestamp_value(unit, n),
        other => Value::Text(format!("{other:?}")),
    }
}

fn timestamp_value(unit: TimeUnit, n: i64) -> Value {
    let ts = match unit {
        TimeUnit::Second => DateTime::<Utc>::from_timestamp(n, 0),
        TimeUnit::Millisecond => DateTime::<Utc>::from_timestamp_millis(n),
        TimeUnit::Microsecond => DateTime::<Utc>::from_timestamp_micros(n),
        TimeUnit::Nanosecond => DateTime::<Utc>::from_timestamp_micros(n / 1_000),
    };
    ts.map_or(Value::Integer(n), Value::Timestamp)
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
