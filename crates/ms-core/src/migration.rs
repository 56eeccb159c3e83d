//! Migration definitions.
//!
//! [`Migration`] is the capability the engine consumes: an identity, an
//! ordering key and the SQL text for both directions. [`SqlMigration`] is the
//! plain-data implementation loaded from migration files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A reversible schema change unit.
///
/// Implementations must be pure: `resolve_forward`/`resolve_backward` return
/// the same text on every call, otherwise the fingerprint of the migration set
/// changes between runs.
pub trait Migration: Send + Sync {
    /// Stable, unique identifier
    fn id(&self) -> &str;

    /// Sequencing key; ascending for apply, descending for revert
    fn order(&self) -> i64;

    /// Human-readable description
    fn description(&self) -> &str {
        ""
    }

    /// SQL executed when applying
    fn resolve_forward(&self) -> String;

    /// SQL executed when reverting
    fn resolve_backward(&self) -> String;
}

impl fmt::Debug for dyn Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("id", &self.id())
            .field("order", &self.order())
            .finish()
    }
}

/// Migration whose forward and backward actions are fixed SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SqlMigration {
    /// Migration id; defaults to the file stem when loaded from disk
    #[serde(default)]
    pub id: String,

    /// Sequencing key
    pub order: i64,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// SQL applied going forward
    pub forward: String,

    /// SQL applied going backward
    pub backward: String,
}

impl SqlMigration {
    /// Create a migration from its parts
    pub fn new(
        id: impl Into<String>,
        order: i64,
        forward: impl Into<String>,
        backward: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            order,
            description: String::new(),
            forward: forward.into(),
            backward: backward.into(),
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl Migration for SqlMigration {
    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn resolve_forward(&self) -> String {
        self.forward.clone()
    }

    fn resolve_backward(&self) -> String {
        self.backward.clone()
    }
}
