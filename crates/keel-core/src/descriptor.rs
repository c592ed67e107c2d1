//! Migration file name parsing.
//!
//! Scripts are named `<sequence>_<name>.<up|down>.sql`, e.g. `01_initial.up.sql`.
//! Sequence numbers are positive integers; leading zeros are allowed.

use std::fmt;

/// Which way a script moves the schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    /// Version `n` to `n + 1`
    Up,
    /// Version `n + 1` back to `n`
    Down,
}

impl Direction {
    /// Lowercase name as it appears in file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A migration file name that follows the naming convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationDescriptor {
    /// 1-based sequence number
    pub position: u64,

    /// Script direction
    pub direction: Direction,

    /// Free-form part between the sequence number and the direction suffix
    pub label: String,

    /// Full file name the descriptor was parsed from
    pub source_name: String,
}

impl MigrationDescriptor {
    /// Parse a bare file name, returning `None` when it does not follow the
    /// naming convention.
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(".sql")?;
        let (rest, direction) = if let Some(rest) = stem.strip_suffix(".up") {
            (rest, Direction::Up)
        } else if let Some(rest) = stem.strip_suffix(".down") {
            (rest, Direction::Down)
        } else {
            return None;
        };

        let (sequence, label) = rest.split_once('_')?;
        if sequence.is_empty() || !sequence.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        // Overflowing sequence numbers are treated as non-matching.
        let position: u64 = sequence.parse().ok()?;
        if position == 0 {
            return None;
        }

        Some(Self {
            position,
            direction,
            label: label.to_string(),
            source_name: file_name.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "descriptor_test.rs"]
mod tests;
