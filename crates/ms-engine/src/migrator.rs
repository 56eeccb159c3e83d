//! The migration engine facade.

use crate::error::{MigrateError, MigrateResult};
use crate::executor::{self, BatchReport, RunConfig};
use crate::ledger::{self, LedgerRow};
use crate::reconcile::{self, SyncReport};
use crate::registry::{Direction, MigrationRegistry};
use crate::schema::{self, BootstrapReport, LedgerSchema};
use crate::scope;
use chrono::Utc;
use ms_core::Migration;
use ms_db::{Database, Transaction};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// State of one registered migration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    pub id: String,
    pub order: i64,
    pub description: String,
    pub executed: bool,
    /// When the ledger last recorded an apply, RFC 3339
    pub executed_at: Option<String>,
}

/// Snapshot of the registry against the persisted ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Fingerprint of the registered set
    pub fingerprint: String,
    /// Fingerprint stored in the version-config row
    pub persisted_hash: String,
    /// Registered migrations, ascending by order
    pub migrations: Vec<MigrationStatus>,
}

impl StatusReport {
    /// Whether the stored fingerprint matches the registered set
    pub fn in_sync(&self) -> bool {
        self.fingerprint == self.persisted_hash
    }

    /// Number of migrations not yet applied
    pub fn pending_count(&self) -> usize {
        self.migrations.iter().filter(|m| !m.executed).count()
    }
}

/// Registers migrations, keeps them reconciled with the ledger, and runs
/// them forward or backward.
///
/// Every operation takes `&mut self`, so one `Migrator` never runs two
/// operations at once.
pub struct Migrator {
    db: Arc<dyn Database>,
    schema: LedgerSchema,
    registry: MigrationRegistry,
}

impl Migrator {
    /// Engine using the default control table names
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self::with_schema(db, LedgerSchema::default())
    }

    /// Engine using custom control table names
    pub fn with_schema(db: Arc<dyn Database>, schema: LedgerSchema) -> Self {
        Self {
            db,
            schema,
            registry: MigrationRegistry::new(),
        }
    }

    /// Control table names
    pub fn schema(&self) -> &LedgerSchema {
        &self.schema
    }

    /// Registered migrations
    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    /// Fingerprint of the registered set
    pub fn fingerprint(&self) -> String {
        self.registry.fingerprint()
    }

    /// Create missing control tables
    pub async fn ensure_schema(&mut self) -> MigrateResult<BootstrapReport> {
        let mut tx = self.db.begin().await?;
        let result = schema::ensure_schema(tx.as_mut(), &self.schema).await;
        let report = scope::finish(tx, result).await?;
        if report.created_any() {
            log::info!(
                "Created migration control tables in {} database",
                self.db.db_type()
            );
        }
        Ok(report)
    }

    /// Register `migrations` and reconcile the ledger in one transaction.
    ///
    /// Ids are checked for duplicates before anything is registered or
    /// written. If the transaction fails the registry is left as it was.
    pub async fn register_migrations<I>(&mut self, migrations: I) -> MigrateResult<SyncReport>
    where
        I: IntoIterator<Item = Box<dyn Migration>>,
    {
        let migrations: Vec<Box<dyn Migration>> = migrations.into_iter().collect();
        let mut seen = HashSet::new();
        for migration in &migrations {
            let id = migration.id();
            if self.registry.contains(id) || !seen.insert(id) {
                return Err(MigrateError::DuplicateMigration { id: id.to_string() });
            }
        }

        let checkpoint = self.registry.checkpoint();
        let mut tx = self.db.begin().await?;
        let result = register_all(tx.as_mut(), &self.schema, &mut self.registry, migrations).await;
        let result = scope::finish(tx, result).await;
        if result.is_err() {
            self.registry.restore(checkpoint);
        }
        result
    }

    /// Register one migration without reconciling
    pub async fn add_migration(&mut self, migration: Box<dyn Migration>) -> MigrateResult<bool> {
        let checkpoint = self.registry.checkpoint();
        let mut tx = self.db.begin().await?;
        let result = reconcile::add_migration(
            tx.as_mut(),
            &self.schema,
            &mut self.registry,
            migration,
            Utc::now(),
        )
        .await;
        let result = scope::finish(tx, result).await;
        if result.is_err() {
            self.registry.restore(checkpoint);
        }
        result
    }

    /// Reconcile the ledger with the registered set
    pub async fn sync(&mut self) -> MigrateResult<SyncReport> {
        let checkpoint = self.registry.checkpoint();
        let mut tx = self.db.begin().await?;
        let result = reconcile::sync(tx.as_mut(), &self.schema, &mut self.registry, Utc::now()).await;
        let result = scope::finish(tx, result).await;
        if result.is_err() {
            self.registry.restore(checkpoint);
        }
        result
    }

    /// Apply every pending migration
    pub async fn apply_all(&mut self) -> MigrateResult<BatchReport> {
        self.apply(RunConfig::unbounded()).await
    }

    /// Apply up to `config.limit` pending migrations, ascending by order
    pub async fn apply(&mut self, config: RunConfig) -> MigrateResult<BatchReport> {
        self.require_migrations()?;
        let batch = executor::select_batch(&self.registry, Direction::Forward, config);
        if batch.is_empty() {
            log::info!("No pending migrations to apply");
        }
        executor::run_batch(
            self.db.as_ref(),
            &self.schema,
            &mut self.registry,
            &batch,
            Direction::Forward,
        )
        .await
    }

    /// Revert every applied migration
    pub async fn revert_all(&mut self) -> MigrateResult<BatchReport> {
        self.revert(RunConfig::unbounded()).await
    }

    /// Revert up to `config.limit` applied migrations, descending by order.
    ///
    /// After a successful batch the stored fingerprint is cleared so the next
    /// sync reconciles in full.
    pub async fn revert(&mut self, config: RunConfig) -> MigrateResult<BatchReport> {
        self.require_migrations()?;
        let batch = executor::select_batch(&self.registry, Direction::Backward, config);
        if batch.is_empty() {
            log::info!("No applied migrations to revert");
        }
        let report = executor::run_batch(
            self.db.as_ref(),
            &self.schema,
            &mut self.registry,
            &batch,
            Direction::Backward,
        )
        .await?;
        self.clear_fingerprint().await?;
        Ok(report)
    }

    /// Registered migrations with their ledger state
    pub async fn status(&mut self) -> MigrateResult<StatusReport> {
        let mut tx = self.db.begin().await?;
        let result = read_ledger_state(tx.as_mut(), &self.schema).await;
        let (persisted_hash, rows) = scope::finish(tx, result).await?;

        let mut migrations: Vec<MigrationStatus> = self
            .registry
            .iter()
            .map(|entry| MigrationStatus {
                id: entry.id().to_string(),
                order: entry.order(),
                description: entry.migration().description().to_string(),
                executed: entry.executed(),
                executed_at: rows
                    .iter()
                    .find(|r| r.id == entry.id())
                    .and_then(|r| r.executed_at.clone()),
            })
            .collect();
        migrations.sort_by_key(|m| m.order);

        Ok(StatusReport {
            fingerprint: self.registry.fingerprint(),
            persisted_hash,
            migrations,
        })
    }

    fn require_migrations(&self) -> MigrateResult<()> {
        if self.registry.has_any() {
            Ok(())
        } else {
            Err(MigrateError::Configuration(
                "no migrations registered".to_string(),
            ))
        }
    }

    async fn clear_fingerprint(&mut self) -> MigrateResult<()> {
        let mut tx = self.db.begin().await?;
        let result = ledger::write_hash(tx.as_mut(), &self.schema, "", Utc::now()).await;
        scope::finish(tx, result).await?;
        log::debug!("Cleared stored migration fingerprint");
        Ok(())
    }
}

async fn register_all(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
    registry: &mut MigrationRegistry,
    migrations: Vec<Box<dyn Migration>>,
) -> MigrateResult<SyncReport> {
    let now = Utc::now();
    for migration in migrations {
        reconcile::add_migration(tx, schema, registry, migration, now).await?;
    }
    reconcile::sync(tx, schema, registry, now).await
}

async fn read_ledger_state(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
) -> MigrateResult<(String, Vec<LedgerRow>)> {
    let persisted_hash = ledger::read_hash(tx, schema).await?;
    let rows = ledger::load_rows(tx, schema).await?;
    Ok((persisted_hash, rows))
}

impl std::fmt::Debug for Migrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Migrator")
            .field("db", &self.db.db_type())
            .field("schema", &self.schema)
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
#[path = "migrator_test.rs"]
mod tests;
