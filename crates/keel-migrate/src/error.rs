//! Error types for the migration engine.

use keel_core::Direction;
use keel_db::DbError;
use thiserror::Error;

/// Migration engine errors.
///
/// Every variant names the versions involved so drift between deployed code
/// and deployed schema can be diagnosed from the message alone.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Requested target is beyond the migration set (M001).
    #[error("[M001] Invalid target: target version {target} is higher than max migration version {max}")]
    TargetTooHigh { target: u64, max: u64 },

    /// Persisted version is beyond the migration set (M002).
    #[error("[M002] Corrupt version: database version {current} is higher than max migration version {max}")]
    CorruptVersion { current: u64, max: u64 },

    /// A script failed; the whole call was rolled back (M003).
    #[error("[M003] {direction} migration {version} failed: {source}")]
    ScriptFailed {
        direction: Direction,
        version: u64,
        #[source]
        source: DbError,
    },

    /// The migration transaction could not be started (M004).
    #[error("[M004] Failed to begin migration transaction: {0}")]
    Begin(#[source] DbError),

    /// Reading or writing `schema_migrations` failed (M005).
    #[error("[M005] Version bookkeeping failed: {0}")]
    VersionStore(#[source] DbError),

    /// COMMIT failed (M006).
    #[error("[M006] Failed to commit migration to version {target}: {source}")]
    Commit {
        target: u64,
        #[source]
        source: DbError,
    },
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
