//! keel-db - Database abstraction layer for Keel
//!
//! This crate provides the `Database` and `Transaction` traits the migration
//! engine runs against, with implementations for SQLite and DuckDB.

pub mod duckdb;
pub mod error;
pub mod sqlite;
pub mod traits;

pub use crate::duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use sqlite::SqliteBackend;
pub use traits::{Database, Dialect, Transaction};

use keel_core::{DatabaseConfig, DbType};

/// Open the database described by `config`.
pub fn connect(config: &DatabaseConfig) -> DbResult<Box<dyn Database>> {
    log::debug!("Opening {} database at '{}'", config.db_type, config.path);
    match config.db_type {
        DbType::Sqlite => {
            let backend =
                SqliteBackend::new(&config.path)?.with_busy_timeout(config.busy_timeout())?;
            Ok(Box::new(backend))
        }
        DbType::DuckDb => Ok(Box::new(DuckDbBackend::new(&config.path)?)),
    }
}
