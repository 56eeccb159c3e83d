//! Migration engine for migrasync.
//!
//! Bootstraps the control tables, reconciles the registered migration set
//! with the persisted ledger, and applies or reverts migrations in bounded
//! batches. [`Migrator`] ties the pieces together.

pub mod error;
pub mod executor;
pub mod ledger;
pub mod migrator;
pub mod reconcile;
pub mod registry;
pub mod schema;
pub(crate) mod scope;

pub use error::{MigrateError, MigrateResult};
pub use executor::{BatchReport, RunConfig};
pub use ledger::LedgerRow;
pub use migrator::{MigrationStatus, Migrator, StatusReport};
pub use reconcile::SyncReport;
pub use registry::{Direction, MigrationRegistry, RegisteredMigration};
pub use schema::{BootstrapReport, LedgerSchema};
