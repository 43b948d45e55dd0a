use std::path::PathBuf;
use thiserror::Error;

use crate::models::ItemId;

/// Errors raised while constructing fingerprint inputs.
#[derive(Debug, Error)]
pub enum FingerprintError {
    #[error("peak component {index} is {value}, must be below {limit}")]
    ComponentOutOfRange { index: usize, value: u32, limit: u64 },
    #[error("fuzz factor must be positive")]
    ZeroFuzzFactor,
}

/// Structural failures of a fingerprint database.
///
/// Every variant is fatal: a build that hits one is abandoned and a load that
/// hits one yields no database at all.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("item {item} is already registered")]
    DuplicateRegistration { item: ItemId },
    #[error("an item named {name:?} is already registered")]
    DuplicateName { name: String },
    #[error("no database at {path}")]
    Missing { path: PathBuf },
    #[error("database at {path} is incomplete: {source}")]
    Incomplete {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("index references item {item} which has no registry entry")]
    Inconsistent { item: ItemId },
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode database: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures of a peak tuple source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse peak tuples in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to list {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Errors from the library-level build and query helpers.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
}
