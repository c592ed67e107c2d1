//! Database capability traits

use crate::error::DbResult;
use async_trait::async_trait;

/// SQL spelling differences between the supported engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// SQLite, which accepts arbitrary type names
    Sqlite,
    /// DuckDB, which only accepts its own type names
    DuckDb,
}

impl Dialect {
    /// Column type for an unsigned 64-bit integer
    pub fn uint64_type(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "uint64",
            Dialect::DuckDb => "UBIGINT",
        }
    }

    /// Column type for a boolean
    pub fn bool_type(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "bool",
            Dialect::DuckDb => "BOOLEAN",
        }
    }
}

/// Database abstraction trait for Keel
///
/// Implementations must be Send + Sync for async operation. The
/// non-transactional helpers wait for any open [`Transaction`] on the same
/// handle, so do not call them while holding one.
#[async_trait]
pub trait Database: Send + Sync {
    /// Begin a write transaction.
    ///
    /// Blocks until the engine grants write access (or its own wait policy
    /// gives up). The returned transaction rolls back when dropped without
    /// being committed.
    async fn begin<'a>(&'a self) -> DbResult<Box<dyn Transaction + 'a>>;

    /// Execute one or more SQL statements outside an explicit transaction
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Execute query returning row count
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Check if a table or view exists
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Check if an index exists
    async fn index_exists(&self, name: &str) -> DbResult<bool>;

    /// SQL dialect spoken by this backend
    fn dialect(&self) -> Dialect;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// An open write transaction.
///
/// Dropping a transaction without calling [`commit`](Transaction::commit) or
/// [`rollback`](Transaction::rollback) rolls it back, so early returns,
/// panics and cancelled futures never leave partial work behind.
#[async_trait]
pub trait Transaction: Send {
    /// Execute one or more SQL statements
    async fn execute_batch(&mut self, sql: &str) -> DbResult<()>;

    /// Read the first column of the first row as an unsigned integer,
    /// `None` when the query returns no rows
    async fn query_u64(&mut self, sql: &str) -> DbResult<Option<u64>>;

    /// Commit the transaction
    async fn commit(self: Box<Self>) -> DbResult<()>;

    /// Roll the transaction back
    async fn rollback(self: Box<Self>) -> DbResult<()>;
}
