use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::models::FuzzFactor;

/// Settings shared by library builds and queries.
///
/// ```toml
/// library = "/srv/music/peaks"
/// database = "/srv/music/songs.db.json"
/// fuzz_factor = 2
/// limit = 5
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MatchConfig {
    /// Directory holding one peak tuple file per library item.
    pub library: PathBuf,
    /// Location of the persisted database.
    pub database: PathBuf,
    /// Must stay the same between building and querying a database.
    #[serde(default)]
    pub fuzz_factor: FuzzFactor,
    /// Maximum number of candidates returned by a query; all when unset.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl MatchConfig {
    pub fn new(library: impl Into<PathBuf>, database: impl Into<PathBuf>) -> Self {
        MatchConfig {
            library: library.into(),
            database: database.into(),
            fuzz_factor: FuzzFactor::default(),
            limit: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}
