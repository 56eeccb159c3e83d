//! ms-core - Core library for migrasync
//!
//! This crate provides the migration capability trait, migration file
//! discovery, configuration parsing, and the fingerprint used to detect a new
//! version of the migration set.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod migration;
pub mod project;

pub use config::{Config, DbType, LedgerConfig};
pub use error::{CoreError, CoreResult};
pub use fingerprint::{compute_checksum, compute_fingerprint};
pub use migration::{Migration, SqlMigration};
pub use project::{MigrationFile, Project};
