//! Control table layout and bootstrap.
//!
//! Two tables back the engine: the ledger (one row per known migration id)
//! and the version config (a singleton row holding the fingerprint of the
//! last synced migration set).

use crate::error::MigrateResult;
use ms_core::LedgerConfig;
use ms_db::{Transaction, Value};

/// Names of the control tables.
///
/// Table names are interpolated into SQL; [`LedgerConfig`] validation limits
/// them to plain identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSchema {
    migrations_table: String,
    config_table: String,
}

impl Default for LedgerSchema {
    fn default() -> Self {
        Self::from(&LedgerConfig::default())
    }
}

impl From<&LedgerConfig> for LedgerSchema {
    fn from(config: &LedgerConfig) -> Self {
        Self::new(&config.migrations_table, &config.config_table)
    }
}

impl LedgerSchema {
    /// Use custom table names
    pub fn new(migrations_table: &str, config_table: &str) -> Self {
        Self {
            migrations_table: migrations_table.to_string(),
            config_table: config_table.to_string(),
        }
    }

    /// Ledger table name
    pub fn migrations_table(&self) -> &str {
        &self.migrations_table
    }

    /// Version-config table name
    pub fn config_table(&self) -> &str {
        &self.config_table
    }

    pub(crate) fn create_migrations_table_sql(&self) -> String {
        format!(
            r#"CREATE TABLE "{}" (
    "Id" VARCHAR UNIQUE,
    "Position" INTEGER,
    "Executed" INTEGER,
    "ExecutedAt" VARCHAR,
    "CreatedAt" TIMESTAMP
)"#,
            self.migrations_table
        )
    }

    pub(crate) fn create_config_table_sql(&self) -> String {
        format!(
            r#"CREATE TABLE "{}" (
    "Id" INTEGER UNIQUE,
    "Hash" VARCHAR,
    "UpdatedAt" TIMESTAMP
)"#,
            self.config_table
        )
    }

    pub(crate) fn insert_config_row_sql(&self) -> String {
        format!(
            r#"INSERT INTO "{}" ("Id", "Hash") VALUES (?, ?)"#,
            self.config_table
        )
    }
}

/// Which control tables [`ensure_schema`] had to create
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// The ledger table was created
    pub created_migrations_table: bool,
    /// The version-config table was created and seeded
    pub created_config_table: bool,
}

impl BootstrapReport {
    /// Whether anything was created
    pub fn created_any(&self) -> bool {
        self.created_migrations_table || self.created_config_table
    }
}

/// Create whichever control tables are missing.
///
/// A freshly created version-config table is seeded with `(Id=1, Hash='')`.
/// Tables that already exist are left untouched.
pub async fn ensure_schema(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
) -> MigrateResult<BootstrapReport> {
    let has_migrations = tx.table_exists(schema.migrations_table()).await?;
    let has_config = tx.table_exists(schema.config_table()).await?;
    let mut report = BootstrapReport::default();

    if !has_migrations {
        log::debug!("Creating ledger table {}", schema.migrations_table());
        tx.execute(&schema.create_migrations_table_sql(), &[])
            .await?;
        report.created_migrations_table = true;
    }

    if !has_config {
        log::debug!("Creating version config table {}", schema.config_table());
        tx.execute(&schema.create_config_table_sql(), &[]).await?;
        tx.execute(
            &schema.insert_config_row_sql(),
            &[Value::Integer(1), Value::from("")],
        )
        .await?;
        report.created_config_table = true;
    }

    Ok(report)
}

#[cfg(test)]
#[path = "schema_test.rs"]
mod tests;
