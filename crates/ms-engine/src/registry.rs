//! In-memory migration registry.
//!
//! Holds the registered migrations in registration order together with the
//! cached executed flag of each one.

use crate::error::{MigrateError, MigrateResult};
use ms_core::{compute_fingerprint, Migration};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Execution direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Apply pending migrations, ascending by order
    Forward,
    /// Revert applied migrations, descending by order
    Backward,
}

impl Direction {
    /// Executed state a migration ends up in after running in this direction
    pub fn target_state(self) -> bool {
        matches!(self, Direction::Forward)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "apply"),
            Direction::Backward => write!(f, "revert"),
        }
    }
}

/// A registered migration and its cached executed flag
pub struct RegisteredMigration {
    migration: Box<dyn Migration>,
    executed: bool,
}

impl RegisteredMigration {
    /// The migration definition
    pub fn migration(&self) -> &dyn Migration {
        self.migration.as_ref()
    }

    /// Migration id
    pub fn id(&self) -> &str {
        self.migration.id()
    }

    /// Migration order
    pub fn order(&self) -> i64 {
        self.migration.order()
    }

    /// Whether the migration is applied, as last known in memory
    pub fn executed(&self) -> bool {
        self.executed
    }
}

impl fmt::Debug for RegisteredMigration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredMigration")
            .field("id", &self.id())
            .field("order", &self.order())
            .field("executed", &self.executed)
            .finish()
    }
}

/// Registry state saved by [`MigrationRegistry::checkpoint`]
#[derive(Debug, Clone)]
pub(crate) struct RegistryCheckpoint {
    len: usize,
    flags: Vec<bool>,
}

/// Ordered collection of registered migrations
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    entries: Vec<RegisteredMigration>,
    index: HashMap<String, usize>,
}

impl MigrationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a migration; ids must be unique
    pub fn register(&mut self, migration: Box<dyn Migration>) -> MigrateResult<()> {
        let id = migration.id().to_string();
        if self.index.contains_key(&id) {
            return Err(MigrateError::DuplicateMigration { id });
        }
        self.index.insert(id, self.entries.len());
        self.entries.push(RegisteredMigration {
            migration,
            executed: false,
        });
        Ok(())
    }

    /// Whether at least one migration is registered
    pub fn has_any(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Number of registered migrations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a migration by id
    pub fn get(&self, id: &str) -> Option<&RegisteredMigration> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    /// Whether `id` is registered
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Migrations in registration order
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredMigration> {
        self.entries.iter()
    }

    /// Ids of the migrations still to run in `direction`, in run order.
    ///
    /// Forward: unexecuted, ascending by order. Backward: executed,
    /// descending by order. Equal orders keep registration order.
    pub fn pending(&self, direction: Direction) -> Vec<String> {
        let mut selected: Vec<&RegisteredMigration> = self
            .entries
            .iter()
            .filter(|e| e.executed != direction.target_state())
            .collect();
        match direction {
            Direction::Forward => selected.sort_by_key(|e| e.order()),
            Direction::Backward => selected.sort_by_key(|e| std::cmp::Reverse(e.order())),
        }
        selected.into_iter().map(|e| e.id().to_string()).collect()
    }

    /// Fingerprint of the registered set, in registration order
    pub fn fingerprint(&self) -> String {
        compute_fingerprint(self.entries.iter().map(|e| e.migration()))
    }

    /// Capture the registered set and flags so a failed operation can undo
    /// its in-memory changes
    pub(crate) fn checkpoint(&self) -> RegistryCheckpoint {
        RegistryCheckpoint {
            len: self.entries.len(),
            flags: self.entries.iter().map(|e| e.executed).collect(),
        }
    }

    /// Drop entries registered after `checkpoint` and restore its flags
    pub(crate) fn restore(&mut self, checkpoint: RegistryCheckpoint) {
        for entry in self.entries.drain(checkpoint.len..) {
            self.index.remove(entry.id());
        }
        for (entry, executed) in self.entries.iter_mut().zip(checkpoint.flags) {
            entry.executed = executed;
        }
    }

    pub(crate) fn set_executed(&mut self, id: &str, executed: bool) {
        if let Some(&i) = self.index.get(id) {
            self.entries[i].executed = executed;
        }
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
