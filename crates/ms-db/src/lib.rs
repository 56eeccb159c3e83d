//! ms-db - Database abstraction layer for migrasync
//!
//! This crate provides the `Database` and `Transaction` traits the migration
//! engine runs against, the `Value`/`Row`/`ResultSet` types that cross that
//! boundary, and a DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;
pub mod value;

pub use duckdb::{DuckDbBackend, DuckDbTransaction};
pub use error::{DbError, DbResult};
pub use traits::{Database, Transaction};
pub use value::{ResultSet, Row, Value};
