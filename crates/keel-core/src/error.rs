//! Error types for keel-core

use crate::descriptor::Direction;
use thiserror::Error;

/// Core error type for Keel
#[derive(Error, Debug)]
pub enum CoreError {
    /// K001: Up and down script lists differ in length
    #[error("[K001] Mismatched migration pairs: {up} up scripts but {down} down scripts")]
    MismatchedPair { up: usize, down: usize },

    /// K002: A position in `1..=max` has no file for one direction
    #[error("[K002] Incomplete migration set: missing {direction} migration for position {position} (found {up} up files and {down} down files)")]
    IncompleteSet {
        position: u64,
        direction: Direction,
        up: usize,
        down: usize,
    },

    /// K003: Two files claim the same position and direction
    #[error("[K003] Duplicate {direction} migration for position {position}: '{first}' and '{second}'")]
    DuplicateMigration {
        position: u64,
        direction: Direction,
        first: String,
        second: String,
    },

    /// K004: Script body could not be read
    #[error("[K004] Failed to read migration '{name}': {source}")]
    ReadMigration {
        name: String,
        source: std::io::Error,
    },

    /// K005: Migration source directory does not exist
    #[error("[K005] Migration source not found: {path}")]
    SourceNotFound { path: String },

    /// K006: Configuration file not found
    #[error("[K006] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// K007: Invalid configuration value
    #[error("[K007] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// K008: IO error with file path context
    #[error("[K008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// K009: YAML parse error
    #[error("[K009] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
