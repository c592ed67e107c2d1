//! Migration engine.
//!
//! A call to [`migrate`] runs inside one database transaction: the version is
//! read, the minimal run of up or down scripts is applied, the new version is
//! written, and everything commits together. Any failure rolls the whole call
//! back, so the database is either at the target version or exactly where it
//! started.
//!
//! Concurrent callers are serialized by the database's own write lock. A
//! caller that waited for another migration to finish re-reads the version
//! inside its transaction, finds it already at the target, and commits a
//! no-op.

use crate::error::{MigrateError, MigrateResult};
use crate::version_store::VersionStore;
use async_trait::async_trait;
use keel_core::{Direction, MigrationSet};
use keel_db::{Database, Transaction};

/// What a migrate call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOutcome {
    /// Version found in the database when the transaction started
    pub from: u64,
    /// Version committed
    pub to: u64,
    /// Number of scripts executed
    pub applied: usize,
}

impl MigrationOutcome {
    /// True when the database was already at the target version
    pub fn is_noop(&self) -> bool {
        self.applied == 0
    }
}

/// Run a [`MigrationSet`] against a database.
#[async_trait]
pub trait Migrate {
    /// Move the database to `target`, applying up or down scripts as needed.
    async fn migrate(&self, db: &dyn Database, target: u64) -> MigrateResult<MigrationOutcome>;

    /// Apply every pending up script.
    async fn up(&self, db: &dyn Database) -> MigrateResult<MigrationOutcome>;

    /// Revert every applied migration.
    async fn down(&self, db: &dyn Database) -> MigrateResult<MigrationOutcome>;
}

#[async_trait]
impl Migrate for MigrationSet {
    async fn migrate(&self, db: &dyn Database, target: u64) -> MigrateResult<MigrationOutcome> {
        migrate(self, db, target).await
    }

    async fn up(&self, db: &dyn Database) -> MigrateResult<MigrationOutcome> {
        migrate(self, db, self.max_version()).await
    }

    async fn down(&self, db: &dyn Database) -> MigrateResult<MigrationOutcome> {
        migrate(self, db, 0).await
    }
}

/// Move `db` to version `target` using the scripts in `set`.
///
/// Dropping the returned future before it completes rolls the transaction
/// back.
pub async fn migrate(
    set: &MigrationSet,
    db: &dyn Database,
    target: u64,
) -> MigrateResult<MigrationOutcome> {
    let max = set.max_version();
    if target > max {
        return Err(MigrateError::TargetTooHigh { target, max });
    }

    let store = VersionStore::new(db.dialect());
    let mut tx = db.begin().await.map_err(MigrateError::Begin)?;

    let result = apply(set, &store, tx.as_mut(), target).await;
    match result {
        Ok(outcome) => {
            tx.commit()
                .await
                .map_err(|source| MigrateError::Commit { target, source })?;
            if outcome.is_noop() {
                log::debug!("{} already at version {target}", db.db_type());
            } else {
                log::info!(
                    "Migrated {} from version {} to {} ({} scripts)",
                    db.db_type(),
                    outcome.from,
                    outcome.to,
                    outcome.applied
                );
            }
            Ok(outcome)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                log::debug!("Rollback after failed migration also failed: {rollback_err}");
            }
            Err(err)
        }
    }
}

/// Read the persisted version, creating the bookkeeping table if needed.
pub async fn current_version(db: &dyn Database) -> MigrateResult<u64> {
    let store = VersionStore::new(db.dialect());
    let mut tx = db.begin().await.map_err(MigrateError::Begin)?;
    let version = read_current(&store, tx.as_mut()).await?;
    tx.commit()
        .await
        .map_err(|source| MigrateError::Commit {
            target: version,
            source,
        })?;
    Ok(version)
}

async fn read_current(store: &VersionStore, tx: &mut dyn Transaction) -> MigrateResult<u64> {
    store
        .ensure_schema(tx)
        .await
        .map_err(MigrateError::VersionStore)?;
    store
        .read_version(tx)
        .await
        .map_err(MigrateError::VersionStore)
}

/// Everything between BEGIN and COMMIT. The caller commits on `Ok` and rolls
/// back on `Err`.
async fn apply(
    set: &MigrationSet,
    store: &VersionStore,
    tx: &mut dyn Transaction,
    target: u64,
) -> MigrateResult<MigrationOutcome> {
    let max = set.max_version();
    let current = read_current(store, tx).await?;
    if current > max {
        return Err(MigrateError::CorruptVersion { current, max });
    }
    if current == target {
        return Ok(MigrationOutcome {
            from: current,
            to: target,
            applied: 0,
        });
    }

    // Both bounds are <= max, which is the set's length.
    let (lo, hi) = (current.min(target) as usize, current.max(target) as usize);
    if target > current {
        for index in lo..hi {
            run_script(tx, Direction::Up, index, set.up_scripts()).await?;
        }
    } else {
        for index in (lo..hi).rev() {
            run_script(tx, Direction::Down, index, set.down_scripts()).await?;
        }
    }

    store
        .write_version(tx, target)
        .await
        .map_err(MigrateError::VersionStore)?;

    Ok(MigrationOutcome {
        from: current,
        to: target,
        applied: hi - lo,
    })
}

async fn run_script(
    tx: &mut dyn Transaction,
    direction: Direction,
    index: usize,
    scripts: &[String],
) -> MigrateResult<()> {
    let version = index as u64 + 1;
    log::debug!("Applying {direction} migration {version:03}");
    tx.execute_batch(&scripts[index])
        .await
        .map_err(|source| MigrateError::ScriptFailed {
            direction,
            version,
            source,
        })
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
