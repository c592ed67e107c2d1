//! keel-migrate - transactional schema migrations for Keel
//!
//! Applies a [`keel_core::MigrationSet`] to a [`keel_db::Database`], tracking
//! the applied version in the `schema_migrations` table of the same database.
//!
//! ```no_run
//! use keel_core::MigrationSet;
//! use keel_db::SqliteBackend;
//! use keel_migrate::Migrate;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let set = MigrationSet::new(
//!     ["CREATE TABLE t1(n text);", "CREATE TABLE t2(n text);"],
//!     ["DROP TABLE t1;", "DROP TABLE t2;"],
//! )?;
//! let db = SqliteBackend::new("app.db")?;
//! set.up(&db).await?;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod version_store;

pub use engine::{current_version, migrate, Migrate, MigrationOutcome};
pub use error::{MigrateError, MigrateResult};
pub use version_store::{VersionStore, VERSION_INDEX, VERSION_TABLE};
