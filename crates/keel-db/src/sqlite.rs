//! SQLite database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Database, Dialect, Transaction};
use async_trait::async_trait;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

/// SQLite database backend
///
/// Each backend owns one connection. Independent backends opened on the same
/// file are independent writers; SQLite serializes their transactions and the
/// busy timeout decides how long a writer waits for the lock.
///
/// That wait happens inside [`begin`](Database::begin) and blocks the calling
/// thread. Competing connections driven from one runtime should each run on
/// their own thread or under `tokio::task::spawn_blocking`.
pub struct SqliteBackend {
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Create a new in-memory SQLite connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create a new SQLite connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    /// Set how long to wait for another connection's write lock
    pub fn with_busy_timeout(mut self, timeout: Duration) -> DbResult<Self> {
        self.conn
            .get_mut()
            .busy_timeout(timeout)
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(self)
    }

    async fn query_i64(&self, sql: &str, param: Option<&str>) -> DbResult<i64> {
        let conn = self.conn.lock().await;
        let value: rusqlite::Result<i64> = match param {
            Some(p) => conn.query_row(sql, [p], |row| row.get(0)),
            None => conn.query_row(sql, [], |row| row.get(0)),
        };
        value.map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }
}

#[async_trait]
impl Database for SqliteBackend {
    async fn begin<'a>(&'a self) -> DbResult<Box<dyn Transaction + 'a>> {
        let conn = self.conn.lock().await;
        // IMMEDIATE takes the write lock up front, so a concurrent writer
        // waits here instead of failing halfway through its scripts.
        conn.execute_batch("BEGIN IMMEDIATE").map_err(|e| match DbError::from(e) {
            DbError::TransactionConflict(msg) => DbError::TransactionConflict(msg),
            other => DbError::TransactionError(format!("BEGIN failed: {other}")),
        })?;
        Ok(Box::new(SqliteTransaction {
            conn,
            finished: false,
        }))
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch(sql).map_err(DbError::from)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        let count = self
            .query_i64(&format!("SELECT COUNT(*) FROM ({sql})"), None)
            .await?;
        Ok(count as usize)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let count = self
            .query_i64(
                "SELECT COUNT(*) FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1",
                Some(name),
            )
            .await?;
        Ok(count > 0)
    }

    async fn index_exists(&self, name: &str) -> DbResult<bool> {
        let count = self
            .query_i64(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = ?1",
                Some(name),
            )
            .await?;
        Ok(count > 0)
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn db_type(&self) -> &'static str {
        "sqlite"
    }
}

/// Write transaction holding the backend's connection
pub struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

#[async_trait]
impl Transaction for SqliteTransaction<'_> {
    async fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        self.conn.execute_batch(sql).map_err(DbError::from)
    }

    async fn query_u64(&mut self, sql: &str) -> DbResult<Option<u64>> {
        match self.conn.query_row(sql, [], |row| row.get::<_, i64>(0)) {
            Ok(value) => u64::try_from(value)
                .map(Some)
                .map_err(|_| DbError::DecodeError(format!("negative value {value}: {sql}"))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        let mut tx = self;
        tx.finished = true;
        if let Err(e) = tx.conn.execute_batch("COMMIT") {
            let _ = tx.conn.execute_batch("ROLLBACK");
            return Err(DbError::TransactionError(format!("COMMIT failed: {e}")));
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        let mut tx = self;
        tx.finished = true;
        // SQLite may already have rolled back on its own (e.g. after an I/O
        // error); that leaves nothing to undo.
        if tx.conn.is_autocommit() {
            return Ok(());
        }
        tx.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished && !self.conn.is_autocommit() {
            log::debug!("Rolling back abandoned sqlite transaction");
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

#[cfg(test)]
#[path = "sqlite_test.rs"]
mod tests;
