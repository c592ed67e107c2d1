//! keel-core - Core library for Keel
//!
//! This crate provides the [`MigrationSet`] type, discovery of migration
//! scripts named by convention, and the `keel.yml` configuration used by the
//! other Keel crates.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod migration_set;
pub mod source;

pub use config::{Config, DatabaseConfig, DbType};
pub use descriptor::{Direction, MigrationDescriptor};
pub use error::{CoreError, CoreResult};
pub use loader::{load, load_dir};
pub use migration_set::MigrationSet;
pub use source::{DirSource, MemorySource, MigrationSource};
