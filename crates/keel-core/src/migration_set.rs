//! Ordered, validated collection of up/down script pairs.

use crate::error::{CoreError, CoreResult};

/// An immutable sequence of migrations, one up/down pair per schema version.
///
/// `up[i]` moves the schema from version `i` to `i + 1`; `down[i]` moves it
/// from `i + 1` back to `i`. The pair invariant is checked when the set is
/// built, so a constructed set can always be migrated to any version in
/// `0..=max_version()`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MigrationSet {
    up: Vec<String>,
    down: Vec<String>,
}

impl MigrationSet {
    /// Build a set from parallel lists of up and down scripts.
    pub fn new<U, D>(up: U, down: D) -> CoreResult<Self>
    where
        U: IntoIterator,
        U::Item: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
    {
        let up: Vec<String> = up.into_iter().map(Into::into).collect();
        let down: Vec<String> = down.into_iter().map(Into::into).collect();
        if up.len() != down.len() {
            return Err(CoreError::MismatchedPair {
                up: up.len(),
                down: down.len(),
            });
        }
        Ok(Self { up, down })
    }

    /// Number of migrations in the set
    pub fn len(&self) -> usize {
        self.up.len()
    }

    /// Whether the set has no migrations
    pub fn is_empty(&self) -> bool {
        self.up.is_empty()
    }

    /// Highest version this set can migrate to
    pub fn max_version(&self) -> u64 {
        self.up.len() as u64
    }

    /// Script moving version `index` to `index + 1`
    pub fn up_script(&self, index: usize) -> Option<&str> {
        self.up.get(index).map(String::as_str)
    }

    /// Script moving version `index + 1` back to `index`
    pub fn down_script(&self, index: usize) -> Option<&str> {
        self.down.get(index).map(String::as_str)
    }

    /// All up scripts in version order
    pub fn up_scripts(&self) -> &[String] {
        &self.up
    }

    /// All down scripts in version order
    pub fn down_scripts(&self) -> &[String] {
        &self.down
    }
}

#[cfg(test)]
#[path = "migration_set_test.rs"]
mod tests;
