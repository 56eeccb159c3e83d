//! Reconciliation of the in-memory registry with the persisted ledger.
//!
//! The ledger is the source of truth for whether a migration ran against
//! this database; the registry is the source of truth for which migrations
//! exist. The fingerprint stored in the version-config row lets [`sync`] skip
//! all ledger work when the registered set has not changed since the last
//! sync.

use crate::error::MigrateResult;
use crate::ledger::{self, LedgerRow};
use crate::registry::MigrationRegistry;
use crate::schema::LedgerSchema;
use chrono::{DateTime, Utc};
use ms_core::Migration;
use ms_db::Transaction;
use serde::Serialize;
use std::collections::HashMap;

/// What a [`sync`] call did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Fingerprint of the registered migration set
    pub fingerprint: String,
    /// The persisted fingerprint differed, so the ledger was reconciled
    pub changed: bool,
    /// Ledger rows deleted because no registered migration has their id
    pub pruned: Vec<String>,
    /// Ledger rows inserted for migrations the ledger did not know
    pub inserted: Vec<String>,
    /// Executed flags copied from the ledger into memory
    pub imported: usize,
}

/// Register `migration` and make sure it has a ledger row.
///
/// An existing row wins: nothing is written and its executed flag is copied
/// into memory. Returns `true` when a row was inserted.
pub async fn add_migration(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
    registry: &mut MigrationRegistry,
    migration: Box<dyn Migration>,
    now: DateTime<Utc>,
) -> MigrateResult<bool> {
    let id = migration.id().to_string();
    registry.register(migration)?;

    if let Some(row) = ledger::find_row(tx, schema, &id).await? {
        log::debug!("Migration {id} already in ledger (executed: {})", row.executed);
        registry.set_executed(&id, row.executed);
        return Ok(false);
    }

    if let Some(entry) = registry.get(&id) {
        ledger::insert_row(tx, schema, entry.migration(), now).await?;
    }
    log::debug!("Migration {id} added to ledger");
    Ok(true)
}

/// Bring the ledger and the registry back in line.
///
/// No-op (and no writes) when the persisted fingerprint equals the
/// registry's. Otherwise prunes ledger rows for unregistered ids, imports
/// executed flags for known ids, inserts rows for new ids, and persists the
/// new fingerprint.
pub async fn sync(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
    registry: &mut MigrationRegistry,
    now: DateTime<Utc>,
) -> MigrateResult<SyncReport> {
    let rows = ledger::load_rows(tx, schema).await?;
    let fingerprint = registry.fingerprint();
    let persisted = ledger::read_hash(tx, schema).await?;

    let mut report = SyncReport {
        fingerprint,
        ..SyncReport::default()
    };

    if report.fingerprint == persisted {
        log::debug!("Migration set unchanged ({})", short(&report.fingerprint));
        return Ok(report);
    }
    report.changed = true;
    log::info!(
        "Migration set changed ({} -> {}), reconciling ledger",
        short(&persisted),
        short(&report.fingerprint)
    );

    for row in &rows {
        if !registry.contains(&row.id) {
            log::warn!("Pruning ledger row for unregistered migration {}", row.id);
            ledger::delete_row(tx, schema, &row.id).await?;
            report.pruned.push(row.id.clone());
        }
    }

    let by_id: HashMap<&str, &LedgerRow> = rows.iter().map(|r| (r.id.as_str(), r)).collect();
    let mut imported: Vec<(String, bool)> = Vec::new();
    for entry in registry.iter() {
        match by_id.get(entry.id()) {
            Some(row) => imported.push((entry.id().to_string(), row.executed)),
            None => {
                ledger::insert_row(tx, schema, entry.migration(), now).await?;
                report.inserted.push(entry.id().to_string());
            }
        }
    }

    report.imported = imported.len();
    for (id, executed) in imported {
        registry.set_executed(&id, executed);
    }

    ledger::write_hash(tx, schema, &report.fingerprint, now).await?;
    Ok(report)
}

/// Abbreviated fingerprint for log lines
fn short(hash: &str) -> &str {
    if hash.is_empty() {
        "<none>"
    } else {
        hash.get(..12).unwrap_or(hash)
    }
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod tests;
