use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

use crate::error::DatabaseError;
use crate::index::FingerprintIndex;
use crate::models::ItemId;
use crate::registry::Registry;

/// A built fingerprint library: the registry and the frozen index.
///
/// # Storage Structure
/// One JSON file holding exactly three structures, in this order:
/// - `name_to_id`: item name to id
/// - `id_to_name`: item id to name
/// - `index`: hash key to the (item, window) pairs that produced it
///
/// The file is written to a temporary sibling and renamed into place, and it
/// is only ever read back whole.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Database {
    registry: Registry,
    index: FingerprintIndex,
}

#[derive(Serialize)]
struct PersistedRef<'a> {
    name_to_id: &'a BTreeMap<String, ItemId>,
    id_to_name: &'a BTreeMap<ItemId, String>,
    index: &'a FingerprintIndex,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Persisted {
    name_to_id: BTreeMap<String, ItemId>,
    id_to_name: BTreeMap<ItemId, String>,
    index: FingerprintIndex,
}

impl Database {
    pub(crate) fn from_parts(registry: Registry, index: FingerprintIndex) -> Self {
        Database { registry, index }
    }

    pub fn index(&self) -> &FingerprintIndex {
        &self.index
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn name_of(&self, item: ItemId) -> Option<&str> {
        self.registry.name_of(item)
    }

    /// Writes the database to `path`, replacing any previous file atomically.
    pub fn save(&self, path: &Path) -> Result<(), DatabaseError> {
        let io_err = |source: std::io::Error| DatabaseError::Io {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let (name_to_id, id_to_name) = self.registry.parts();
        let persisted = PersistedRef {
            name_to_id,
            id_to_name,
            index: &self.index,
        };

        let mut temp = NamedTempFile::new_in(dir).map_err(io_err)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer(&mut writer, &persisted)?;
            writer.flush().map_err(io_err)?;
        }
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(path).map_err(|err| io_err(err.error))?;

        info!(
            "Saved database with {} items to {}",
            self.registry.len(),
            path.display()
        );
        Ok(())
    }

    /// Reads a database previously written by [`Database::save`].
    ///
    /// There is no partial load: a missing, truncated or inconsistent file is
    /// an error.
    pub fn load(path: &Path) -> Result<Self, DatabaseError> {
        let file = File::open(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => DatabaseError::Missing {
                path: path.to_path_buf(),
            },
            _ => DatabaseError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let persisted: Persisted = serde_json::from_reader(BufReader::new(file)).map_err(
            |source| DatabaseError::Incomplete {
                path: path.to_path_buf(),
                source,
            },
        )?;

        let registry = Registry::from_parts(persisted.name_to_id, persisted.id_to_name)?;
        if let Some(item) = persisted.index.items().find(|item| !registry.contains(*item)) {
            return Err(DatabaseError::Inconsistent { item });
        }

        info!(
            "Loaded database with {} items and {} keys from {}",
            registry.len(),
            persisted.index.len(),
            path.display()
        );
        Ok(Database::from_parts(registry, persisted.index))
    }
}
