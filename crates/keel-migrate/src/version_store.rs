//! Persisted schema version, kept in the migrated database itself.
//!
//! The table layout matches what other migration tools use, so a database can
//! switch tools without losing its version:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS schema_migrations (version uint64, dirty bool);
//! CREATE UNIQUE INDEX IF NOT EXISTS version_unique ON schema_migrations (version);
//! ```
//!
//! `dirty` is always written `false`: migrations run in one transaction, so
//! there is never a half-applied state to flag.

use keel_db::{DbResult, Dialect, Transaction};

/// Bookkeeping table name
pub const VERSION_TABLE: &str = "schema_migrations";

/// Unique index on the version column
pub const VERSION_INDEX: &str = "version_unique";

/// Reads and writes the single version row.
#[derive(Debug, Clone, Copy)]
pub struct VersionStore {
    dialect: Dialect,
}

impl VersionStore {
    /// Store whose DDL uses `dialect`'s column types.
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// DDL creating the table and index if they are missing.
    pub fn schema_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {VERSION_TABLE} (version {}, dirty {});\n\
             CREATE UNIQUE INDEX IF NOT EXISTS {VERSION_INDEX} ON {VERSION_TABLE} (version);",
            self.dialect.uint64_type(),
            self.dialect.bool_type(),
        )
    }

    /// Create the bookkeeping table and index. Safe to call on every run and
    /// from concurrent callers.
    pub async fn ensure_schema(&self, tx: &mut dyn Transaction) -> DbResult<()> {
        tx.execute_batch(&self.schema_sql()).await
    }

    /// Current version, `0` when no row has been written yet.
    ///
    /// Fails if the table does not exist; call [`ensure_schema`](Self::ensure_schema)
    /// first in the same transaction.
    pub async fn read_version(&self, tx: &mut dyn Transaction) -> DbResult<u64> {
        let version = tx
            .query_u64(&format!("SELECT version FROM {VERSION_TABLE} LIMIT 1"))
            .await?;
        Ok(version.unwrap_or(0))
    }

    /// Replace whatever rows exist with exactly one `(version, false)` row.
    pub async fn write_version(&self, tx: &mut dyn Transaction, version: u64) -> DbResult<()> {
        // Delete + insert rather than upsert: upsert syntax differs per dialect.
        tx.execute_batch(&format!(
            "DELETE FROM {VERSION_TABLE};\n\
             INSERT INTO {VERSION_TABLE} (version, dirty) VALUES ({version}, false);"
        ))
        .await
    }
}

#[cfg(test)]
#[path = "version_store_test.rs"]
mod tests;
