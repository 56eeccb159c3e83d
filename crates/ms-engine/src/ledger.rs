//! Reads and writes against the control tables.

use crate::error::{MigrateError, MigrateResult};
use crate::schema::LedgerSchema;
use chrono::{DateTime, Utc};
use ms_core::Migration;
use ms_db::{Row, Transaction, Value};
use serde::Serialize;

/// Singleton key of the version-config row.
const CONFIG_ROW_ID: i64 = 1;

/// One persisted ledger row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerRow {
    /// Migration id
    pub id: String,
    /// Order of the migration when the row was written
    pub position: i64,
    /// Whether the migration is applied against this database
    pub executed: bool,
    /// When the migration was last applied, RFC 3339
    pub executed_at: Option<String>,
    /// When the row was inserted
    pub created_at: Option<DateTime<Utc>>,
}

impl LedgerRow {
    fn from_row(row: &Row) -> MigrateResult<Self> {
        let parse = || -> ms_db::DbResult<Self> {
            Ok(Self {
                id: row.text("Id")?,
                position: row.integer("Position")?,
                executed: row.flag("Executed")?,
                executed_at: row.optional_text("ExecutedAt")?,
                created_at: row.optional_timestamp("CreatedAt")?,
            })
        };
        parse().map_err(|e| MigrateError::Ledger(format!("unreadable ledger row: {e}")))
    }
}

/// All ledger rows ordered by position
pub async fn load_rows(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
) -> MigrateResult<Vec<LedgerRow>> {
    let sql = format!(
        r#"SELECT "Id", "Position", "Executed", "ExecutedAt", "CreatedAt" FROM "{}" ORDER BY "Position""#,
        schema.migrations_table()
    );
    let result = tx.execute(&sql, &[]).await?;
    result.rows.iter().map(LedgerRow::from_row).collect()
}

/// The ledger row for `id`, if any
pub async fn find_row(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
    id: &str,
) -> MigrateResult<Option<LedgerRow>> {
    let sql = format!(
        r#"SELECT "Id", "Position", "Executed", "ExecutedAt", "CreatedAt" FROM "{}" WHERE "Id" = ?"#,
        schema.migrations_table()
    );
    let result = tx.execute(&sql, &[Value::from(id)]).await?;
    result.first().map(LedgerRow::from_row).transpose()
}

/// Insert an unexecuted row for `migration`
pub async fn insert_row(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
    migration: &dyn Migration,
    now: DateTime<Utc>,
) -> MigrateResult<()> {
    let sql = format!(
        r#"INSERT INTO "{}" ("Id", "Position", "Executed", "CreatedAt") VALUES (?, ?, ?, ?)"#,
        schema.migrations_table()
    );
    tx.execute(
        &sql,
        &[
            Value::from(migration.id()),
            Value::Integer(migration.order()),
            Value::Integer(0),
            Value::Timestamp(now),
        ],
    )
    .await?;
    Ok(())
}

/// Delete the row for `id`
pub async fn delete_row(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
    id: &str,
) -> MigrateResult<()> {
    let sql = format!(
        r#"DELETE FROM "{}" WHERE "Id" = ?"#,
        schema.migrations_table()
    );
    tx.execute(&sql, &[Value::from(id)]).await?;
    Ok(())
}

/// Record the executed state of `id`.
///
/// `ExecutedAt` is stamped when applying and cleared when reverting. Fails
/// when no row exists for `id`.
pub async fn set_executed(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
    id: &str,
    executed: bool,
    now: DateTime<Utc>,
) -> MigrateResult<()> {
    let sql = format!(
        r#"UPDATE "{}" SET "Executed" = ?, "ExecutedAt" = ? WHERE "Id" = ?"#,
        schema.migrations_table()
    );
    let executed_at = executed.then(|| now.to_rfc3339());
    let result = tx
        .execute(
            &sql,
            &[
                Value::Integer(i64::from(executed)),
                Value::from(executed_at),
                Value::from(id),
            ],
        )
        .await?;

    if result.rows_affected == 0 {
        return Err(MigrateError::Ledger(format!(
            "no ledger row for migration '{id}'"
        )));
    }
    Ok(())
}

/// Persisted fingerprint; empty when the config row is missing or NULL
pub async fn read_hash(tx: &mut dyn Transaction, schema: &LedgerSchema) -> MigrateResult<String> {
    let sql = format!(
        r#"SELECT "Hash" FROM "{}" WHERE "Id" = ?"#,
        schema.config_table()
    );
    let result = tx.execute(&sql, &[Value::Integer(CONFIG_ROW_ID)]).await?;
    match result.first() {
        Some(row) => Ok(row
            .optional_text("Hash")
            .map_err(|e| MigrateError::Ledger(format!("unreadable version hash: {e}")))?
            .unwrap_or_default()),
        None => Ok(String::new()),
    }
}

/// Persist `hash` into the version-config row, recreating the row if missing
pub async fn write_hash(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
    hash: &str,
    now: DateTime<Utc>,
) -> MigrateResult<()> {
    let update = format!(
        r#"UPDATE "{}" SET "Hash" = ?, "UpdatedAt" = ? WHERE "Id" = ?"#,
        schema.config_table()
    );
    let result = tx
        .execute(
            &update,
            &[
                Value::from(hash),
                Value::Timestamp(now),
                Value::Integer(CONFIG_ROW_ID),
            ],
        )
        .await?;

    if result.rows_affected == 0 {
        log::warn!(
            "Version config row missing from {}, recreating it",
            schema.config_table()
        );
        let insert = format!(
            r#"INSERT INTO "{}" ("Id", "Hash", "UpdatedAt") VALUES (?, ?, ?)"#,
            schema.config_table()
        );
        tx.execute(
            &insert,
            &[
                Value::Integer(CONFIG_ROW_ID),
                Value::from(hash),
                Value::Timestamp(now),
            ],
        )
        .await?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
