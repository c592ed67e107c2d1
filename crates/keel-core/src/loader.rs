//! Build a [`MigrationSet`] from files named by convention.

use crate::descriptor::{Direction, MigrationDescriptor};
use crate::error::{CoreError, CoreResult};
use crate::migration_set::MigrationSet;
use crate::source::{DirSource, MigrationSource};
use std::path::Path;

/// Discover `<sequence>_<name>.<up|down>.sql` files under `subpath` and load
/// them into a [`MigrationSet`].
///
/// Names that do not follow the convention are ignored. Every position in
/// `1..=max` must have exactly one up and one down file. Files are ordered by
/// position before their bodies are read, so listing order does not matter.
pub fn load<S>(source: &S, subpath: &str) -> CoreResult<MigrationSet>
where
    S: MigrationSource + ?Sized,
{
    let mut up = Vec::new();
    let mut down = Vec::new();
    for name in source.list(subpath)? {
        match MigrationDescriptor::parse(&name) {
            Some(d) if d.direction == Direction::Up => up.push(d),
            Some(d) => down.push(d),
            None => log::debug!("Ignoring non-migration file '{name}'"),
        }
    }

    sort_unique(&mut up)?;
    sort_unique(&mut down)?;

    let max = up
        .last()
        .map(|d| d.position)
        .max(down.last().map(|d| d.position))
        .unwrap_or(0);
    for position in 1..=max {
        for (direction, list) in [(Direction::Up, &up), (Direction::Down, &down)] {
            if list.binary_search_by_key(&position, |d| d.position).is_err() {
                return Err(CoreError::IncompleteSet {
                    position,
                    direction,
                    up: up.len(),
                    down: down.len(),
                });
            }
        }
    }

    let up = read_all(source, subpath, &up)?;
    let down = read_all(source, subpath, &down)?;
    log::debug!("Loaded {} migrations from '{subpath}'", up.len());
    MigrationSet::new(up, down)
}

/// Load migrations from a directory on disk.
pub fn load_dir(path: &Path) -> CoreResult<MigrationSet> {
    load(&DirSource::new(path), "")
}

/// Sort by position (then name, so errors are deterministic) and reject
/// positions claimed twice.
fn sort_unique(list: &mut [MigrationDescriptor]) -> CoreResult<()> {
    list.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then_with(|| a.source_name.cmp(&b.source_name))
    });
    if let Some(pair) = list.windows(2).find(|w| w[0].position == w[1].position) {
        return Err(CoreError::DuplicateMigration {
            position: pair[0].position,
            direction: pair[0].direction,
            first: pair[0].source_name.clone(),
            second: pair[1].source_name.clone(),
        });
    }
    Ok(())
}

fn read_all<S>(source: &S, subpath: &str, list: &[MigrationDescriptor]) -> CoreResult<Vec<String>>
where
    S: MigrationSource + ?Sized,
{
    list.iter()
        .map(|d| {
            source
                .read(subpath, &d.source_name)
                .map_err(|e| CoreError::ReadMigration {
                    name: d.source_name.clone(),
                    source: e,
                })
        })
        .collect()
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
