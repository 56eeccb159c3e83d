//! Apply/revert execution.
//!
//! Each migration moves between two states, unexecuted and executed. A
//! batch walks its migrations strictly in sequence; every step runs the
//! migration's SQL and the ledger update in one transaction and only then
//! flips the in-memory flag. The first failing step stops the batch; steps
//! that finished before it stay committed.

use crate::error::{MigrateError, MigrateResult};
use crate::ledger;
use crate::registry::{Direction, MigrationRegistry};
use crate::schema::LedgerSchema;
use crate::scope;
use chrono::Utc;
use ms_db::{Database, Transaction};
use serde::Serialize;

/// How many migrations one apply/revert call may run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    /// Maximum batch size; `None` runs everything pending
    pub limit: Option<usize>,
}

impl Default for RunConfig {
    /// One migration per call
    fn default() -> Self {
        Self { limit: Some(1) }
    }
}

impl RunConfig {
    /// Run at most `limit` migrations
    pub fn limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }

    /// Run every pending migration
    pub fn unbounded() -> Self {
        Self { limit: None }
    }
}

/// Outcome of one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    /// Direction the batch ran in
    pub direction: Direction,
    /// Migrations that changed state, in run order
    pub executed: Vec<String>,
    /// Migrations already in the target state when their turn came
    pub skipped: Vec<String>,
}

impl BatchReport {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            executed: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Pending migrations for `direction`, truncated to the configured limit
pub fn select_batch(
    registry: &MigrationRegistry,
    direction: Direction,
    config: RunConfig,
) -> Vec<String> {
    let mut batch = registry.pending(direction);
    if let Some(limit) = config.limit {
        batch.truncate(limit);
    }
    batch
}

/// Run `batch` in order, stopping at the first failure.
///
/// Ids that are not registered, or whose migration is already in the target
/// state, are skipped without touching the database.
pub async fn run_batch(
    db: &dyn Database,
    schema: &LedgerSchema,
    registry: &mut MigrationRegistry,
    batch: &[String],
    direction: Direction,
) -> MigrateResult<BatchReport> {
    let mut report = BatchReport::new(direction);
    let target = direction.target_state();
    log::debug!("Running {direction} batch of {} migration(s)", batch.len());

    for id in batch {
        let Some(entry) = registry.get(id) else {
            log::warn!("Migration {id} is not registered, skipping");
            report.skipped.push(id.clone());
            continue;
        };

        if entry.executed() == target {
            match direction {
                Direction::Forward => log::debug!("Migration {id} already executed"),
                Direction::Backward => log::debug!("Migration {id} is not executed yet"),
            }
            report.skipped.push(id.clone());
            continue;
        }

        let sql = match direction {
            Direction::Forward => entry.migration().resolve_forward(),
            Direction::Backward => entry.migration().resolve_backward(),
        };

        let mut tx = db.begin().await?;
        let result = run_step(tx.as_mut(), schema, id, &sql, direction).await;
        if let Err(err) = scope::finish(tx, result).await {
            log::error!("Migration {id} failed to {direction}, stopping batch");
            return Err(err);
        }

        registry.set_executed(id, target);
        log::info!(
            "{} migration {id}",
            match direction {
                Direction::Forward => "Applied",
                Direction::Backward => "Reverted",
            }
        );
        report.executed.push(id.clone());
    }

    Ok(report)
}

/// Run one migration's SQL and record the new state in the ledger.
async fn run_step(
    tx: &mut dyn Transaction,
    schema: &LedgerSchema,
    id: &str,
    sql: &str,
    direction: Direction,
) -> MigrateResult<()> {
    if sql.trim().is_empty() {
        log::debug!("Migration {id} has no SQL to {direction}");
    } else {
        tx.execute_batch(sql)
            .await
            .map_err(|source| MigrateError::Execution {
                id: id.to_string(),
                direction,
                source,
            })?;
    }

    ledger::set_executed(tx, schema, id, direction.target_state(), Utc::now()).await
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
