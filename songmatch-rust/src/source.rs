use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SourceError;
use crate::models::PeakTuple;

/// Produces the peak tuples of one library item or query, one per analysis
/// window, in time order.
///
/// Spectral analysis lives outside this crate; implementations wrap whatever
/// pipeline computes the peaks.
pub trait PeakTupleSource: Sync {
    /// Whether `path` is something this source can read.
    fn accepts(&self, path: &Path) -> bool;

    fn peak_tuples(&self, path: &Path) -> Result<Vec<PeakTuple>, SourceError>;
}

/// Reads peak tuples an external analyser saved as JSON.
///
/// # File Format
/// A JSON array of 4-element integer arrays, lowest band first:
/// `[[40, 130, 220, 512], [41, 128, 220, 498], ...]`
///
/// Components outside the hashable range fail the whole file.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonPeakSource;

impl PeakTupleSource for JsonPeakSource {
    fn accepts(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    fn peak_tuples(&self, path: &Path) -> Result<Vec<PeakTuple>, SourceError> {
        let bytes = fs::read(path).map_err(|source| SourceError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let tuples: Vec<PeakTuple> =
            serde_json::from_slice(&bytes).map_err(|source| SourceError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Read {} peak tuples from {}", tuples.len(), path.display());
        Ok(tuples)
    }
}

/// Lists the files of `dir` that `source` accepts, sorted by file name.
///
/// Only the top level is scanned.
pub fn list_items(dir: &Path, source: &impl PeakTupleSource) -> Result<Vec<PathBuf>, SourceError> {
    let read_dir_err = |source: std::io::Error| SourceError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut items = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        let path = entry.path();
        if path.is_file() && source.accepts(&path) {
            items.push(path);
        }
    }
    items.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_tuples_in_window_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("song.json");
        fs::write(&path, "[[1, 2, 3, 4], [5, 6, 7, 8]]").unwrap();

        let tuples = JsonPeakSource.peak_tuples(&path).unwrap();
        let components: Vec<_> = tuples.iter().map(PeakTuple::components).collect();
        assert_eq!(components, vec![[1, 2, 3, 4], [5, 6, 7, 8]]);
    }

    #[test]
    fn out_of_range_component_fails_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("song.json");
        fs::write(&path, "[[1, 2, 3, 4], [500, 6, 7, 8]]").unwrap();

        assert!(matches!(
            JsonPeakSource.peak_tuples(&path),
            Err(SourceError::Parse { .. })
        ));
    }

    #[test]
    fn lists_accepted_files_by_name() {
        let dir = tempdir().unwrap();
        for name in ["b.json", "a.json", "notes.txt", "C.JSON"] {
            fs::write(dir.path().join(name), "[]").unwrap();
        }
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let names: Vec<_> = list_items(dir.path(), &JsonPeakSource)
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["C.JSON", "a.json", "b.json"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            list_items(&dir.path().join("absent"), &JsonPeakSource),
            Err(SourceError::ReadDir { .. })
        ));
    }
}
