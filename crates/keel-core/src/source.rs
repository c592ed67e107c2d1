//! Where migration scripts come from.
//!
//! A [`MigrationSource`] lists the file names under a sub-path and reads their
//! contents. [`DirSource`] reads from disk; [`MemorySource`] holds scripts in
//! memory, typically embedded into the binary with `include_str!`.

use crate::error::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// A read-only tree of migration files.
pub trait MigrationSource {
    /// List the names of the files directly under `subpath`.
    ///
    /// Nested directories are not descended into and are not listed.
    fn list(&self, subpath: &str) -> CoreResult<Vec<String>>;

    /// Read the file `name` under `subpath`.
    fn read(&self, subpath: &str, name: &str) -> io::Result<String>;
}

/// Migration files in a directory on disk.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    /// Create a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of this source
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn dir(&self, subpath: &str) -> PathBuf {
        if subpath.is_empty() {
            self.root.clone()
        } else {
            self.root.join(subpath)
        }
    }
}

impl MigrationSource for DirSource {
    fn list(&self, subpath: &str) -> CoreResult<Vec<String>> {
        let dir = self.dir(subpath);
        if !dir.is_dir() {
            return Err(CoreError::SourceNotFound {
                path: dir.display().to_string(),
            });
        }

        let io_err = |e: io::Error| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        };

        let mut names = Vec::new();
        for entry in std::fs::read_dir(&dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => log::debug!("Skipping non UTF-8 file name {raw:?}"),
            }
        }
        Ok(names)
    }

    fn read(&self, subpath: &str, name: &str) -> io::Result<String> {
        std::fs::read_to_string(self.dir(subpath).join(name))
    }
}

/// Migration files held in memory, keyed by `/`-separated path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    /// Create an empty source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file, builder style
    pub fn with_file(mut self, path: impl Into<String>, contents: impl Into<String>) -> Self {
        self.insert(path, contents);
        self
    }

    /// Add or replace a file
    pub fn insert(&mut self, path: impl Into<String>, contents: impl Into<String>) {
        let path = path.into();
        self.files
            .insert(path.trim_start_matches('/').to_string(), contents.into());
    }

    fn prefix(subpath: &str) -> String {
        let trimmed = subpath.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        }
    }
}

impl<K, V> FromIterator<(K, V)> for MemorySource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (path, contents) in iter {
            source.insert(path, contents);
        }
        source
    }
}

impl MigrationSource for MemorySource {
    fn list(&self, subpath: &str) -> CoreResult<Vec<String>> {
        let prefix = Self::prefix(subpath);
        let mut found_dir = prefix.is_empty();
        let mut names = Vec::new();
        for path in self.files.keys() {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            found_dir = true;
            if !rest.is_empty() && !rest.contains('/') {
                names.push(rest.to_string());
            }
        }

        if !found_dir {
            return Err(CoreError::SourceNotFound {
                path: subpath.to_string(),
            });
        }
        Ok(names)
    }

    fn read(&self, subpath: &str, name: &str) -> io::Result<String> {
        let path = format!("{}{}", Self::prefix(subpath), name);
        self.files.get(&path).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such file: {path}"))
        })
    }
}

#[cfg(test)]
#[path = "source_test.rs"]
mod tests;
