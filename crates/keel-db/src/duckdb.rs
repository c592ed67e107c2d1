//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{Database, Dialect, Transaction};
use async_trait::async_trait;
use duckdb::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, OwnedMutexGuard};

/// DuckDB database backend
///
/// DuckDB itself is optimistic: two connections writing the same catalog
/// entries do not wait for each other and the later one fails. Only one
/// process may open a file read-write, so every connection to a database is
/// a [`try_clone`](Self::try_clone) of one backend, and those clones share a
/// write gate. [`begin`](Database::begin) takes the gate before `BEGIN` and
/// the transaction holds it until commit, rollback or drop, so writers
/// queue up instead of conflicting.
pub struct DuckDbBackend {
    conn: Mutex<Connection>,
    write_gate: Arc<Mutex<()>>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::with_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::with_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            write_gate: Arc::new(Mutex::new(())),
        }
    }

    /// Open another independent connection to the same database instance.
    ///
    /// Needed to share an in-memory database between callers. The clone
    /// shares this backend's write gate.
    pub async fn try_clone(&self) -> DbResult<Self> {
        let conn = self.conn.lock().await;
        let cloned = conn
            .try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(cloned),
            write_gate: Arc::clone(&self.write_gate),
        })
    }

    async fn query_i64(&self, sql: &str) -> DbResult<i64> {
        let conn = self.conn.lock().await;
        conn.query_row(sql, [], |row| row.get(0))
            .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn begin<'a>(&'a self) -> DbResult<Box<dyn Transaction + 'a>> {
        let gate = Arc::clone(&self.write_gate).lock_owned().await;
        let conn = self.conn.lock().await;
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DbError::TransactionError(format!("BEGIN failed: {e}")))?;
        Ok(Box::new(DuckDbTransaction {
            conn,
            _gate: gate,
            finished: false,
        }))
    }

    async fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.conn.lock().await;
        conn.execute_batch(sql).map_err(DbError::from)
    }

    async fn query_count(&self, sql: &str) -> DbResult<usize> {
        let count = self
            .query_i64(&format!("SELECT COUNT(*) FROM ({sql})"))
            .await?;
        Ok(count as usize)
    }

    async fn relation_exists(&self, name: &str) -> DbResult<bool> {
        // Handle schema-qualified names
        let (schema, table) = if let Some(pos) = name.rfind('.') {
            (&name[..pos], &name[pos + 1..])
        } else {
            ("main", name)
        };

        let sql = format!(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = '{}' AND table_name = '{}'",
            schema.replace('\'', "''"),
            table.replace('\'', "''")
        );
        Ok(self.query_i64(&sql).await? > 0)
    }

    async fn index_exists(&self, name: &str) -> DbResult<bool> {
        let sql = format!(
            "SELECT COUNT(*) FROM duckdb_indexes() WHERE index_name = '{}'",
            name.replace('\'', "''")
        );
        Ok(self.query_i64(&sql).await? > 0)
    }

    fn dialect(&self) -> Dialect {
        Dialect::DuckDb
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Write transaction holding the backend's connection and the shared write
/// gate. Fields drop after `Drop::drop`, so the gate is released only once
/// any rollback has run.
pub struct DuckDbTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    _gate: OwnedMutexGuard<()>,
    finished: bool,
}

#[async_trait]
impl Transaction for DuckDbTransaction<'_> {
    async fn execute_batch(&mut self, sql: &str) -> DbResult<()> {
        self.conn.execute_batch(sql).map_err(DbError::from)
    }

    async fn query_u64(&mut self, sql: &str) -> DbResult<Option<u64>> {
        match self.conn.query_row(sql, [], |row| row.get::<_, u64>(0)) {
            Ok(value) => Ok(Some(value)),
            Err(duckdb::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn commit(self: Box<Self>) -> DbResult<()> {
        let mut tx = self;
        tx.finished = true;
        if let Err(e) = tx.conn.execute_batch("COMMIT") {
            let _ = tx.conn.execute_batch("ROLLBACK");
            return Err(match DbError::from(e) {
                DbError::TransactionConflict(msg) => DbError::TransactionConflict(msg),
                other => DbError::TransactionError(format!("COMMIT failed: {other}")),
            });
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> DbResult<()> {
        let mut tx = self;
        tx.finished = true;
        tx.conn
            .execute_batch("ROLLBACK")
            .map_err(|e| DbError::TransactionError(format!("ROLLBACK failed: {e}")))
    }
}

impl Drop for DuckDbTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            log::debug!("Rolling back abandoned duckdb transaction");
            let _ = self.conn.execute_batch("ROLLBACK");
        }
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
