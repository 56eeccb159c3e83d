//! Error types for the migration engine.

use crate::registry::Direction;
use ms_db::DbError;
use thiserror::Error;

/// Migration engine errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Apply/revert invoked before any migration was registered (M001).
    #[error("[M001] Migrations not configured: {0}")]
    Configuration(String),

    /// A migration id was registered twice (M002).
    #[error("[M002] Migration '{id}' is already registered")]
    DuplicateMigration { id: String },

    /// A migration's own SQL failed; the batch stopped here (M003).
    #[error("[M003] Migration '{id}' failed to {direction}: {source}")]
    Execution {
        id: String,
        direction: Direction,
        #[source]
        source: DbError,
    },

    /// The control tables hold data the engine cannot interpret (M004).
    #[error("[M004] Migration ledger is inconsistent: {0}")]
    Ledger(String),

    /// Database or transaction failure outside a migration's own SQL (M005).
    #[error("[M005] Database error: {0}")]
    Transport(#[from] DbError),
}

impl MigrateError {
    /// Id of the offending migration, for [`MigrateError::Execution`] and
    /// [`MigrateError::DuplicateMigration`]
    pub fn migration_id(&self) -> Option<&str> {
        match self {
            MigrateError::Execution { id, .. } => Some(id),
            MigrateError::DuplicateMigration { id } => Some(id),
            _ => None,
        }
    }
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
