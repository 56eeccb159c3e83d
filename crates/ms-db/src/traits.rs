//! Database trait definitions

use crate::error::DbResult;
use crate::value::{ResultSet, Value};
use async_trait::async_trait;

/// Database abstraction trait for migrasync
///
/// All statements run through a [`Transaction`] obtained from [`begin`].
/// Implementations must be Send + Sync for async operation.
///
/// [`begin`]: Database::begin
#[async_trait]
pub trait Database: Send + Sync {
    /// Open a transaction scope.
    ///
    /// Backends with a single connection serialise scopes: a second `begin`
    /// waits until the previous handle is committed, rolled back or dropped.
    async fn begin(&self) -> DbResult<Box<dyn Transaction + '_>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// A scoped transaction handle.
///
/// Finish the scope with [`commit`](Transaction::commit) or
/// [`rollback`](Transaction::rollback). A handle dropped while still open is
/// rolled back.
#[async_trait]
pub trait Transaction: Send {
    /// Check if a table exists
    async fn table_exists(&mut self, name: &str) -> DbResult<bool>;

    /// Execute one statement with positional `?` binds
    async fn execute(&mut self, sql: &str, binds: &[Value]) -> DbResult<ResultSet>;

    /// Execute a script of one or more statements without binds
    async fn execute_batch(&mut self, sql: &str) -> DbResult<()>;

    /// Commit the transaction
    async fn commit(&mut self) -> DbResult<()>;

    /// Roll the transaction back
    async fn rollback(&mut self) -> DbResult<()>;

    /// Returns `true` until the scope is committed or rolled back
    fn is_open(&self) -> bool;
}
