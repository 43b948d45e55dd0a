use rayon::prelude::*;
use std::path::Path;
use tracing::info;

use crate::config::MatchConfig;
use crate::error::{LibraryError, SourceError};
use crate::index::IndexBuilder;
use crate::matcher;
use crate::models::{FuzzFactor, Identified, PeakTuple};
use crate::sample::SampleIndexer;
use crate::source::{PeakTupleSource, list_items};
use crate::storage::Database;

/// Builds a database from every item `source` accepts in `dir`.
///
/// Items are read in parallel, then registered one by one in file-name order,
/// so ids are 1, 2, 3... in that order. Any unreadable item aborts the build.
pub fn build_library(
    dir: &Path,
    source: &impl PeakTupleSource,
    fuzz: FuzzFactor,
) -> Result<Database, LibraryError> {
    let paths = list_items(dir, source)?;
    info!("Building library of {} items from {}", paths.len(), dir.display());

    let items: Vec<(String, Vec<PeakTuple>)> = paths
        .par_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            source.peak_tuples(path).map(|tuples| (name, tuples))
        })
        .collect::<Result<_, SourceError>>()?;

    let mut builder = IndexBuilder::new(fuzz);
    for (name, tuples) in &items {
        builder.add(name, tuples)?;
    }
    Ok(builder.finish())
}

/// Builds the library named in `config` and saves it to `config.database`.
pub fn build_from_config(
    config: &MatchConfig,
    source: &impl PeakTupleSource,
) -> Result<Database, LibraryError> {
    let db = build_library(&config.library, source, config.fuzz_factor)?;
    db.save(&config.database)?;
    Ok(db)
}

/// Ranks the items of `db` against a sample and resolves their names.
///
/// `fuzz` must be the factor `db` was built with. An empty result means no
/// item shares a single key with the sample.
pub fn identify(db: &Database, tuples: &[PeakTuple], fuzz: FuzzFactor) -> Vec<Identified> {
    let sample = SampleIndexer::new(fuzz).index(tuples);
    matcher::rank(db.index(), &sample, db.registry())
        .into_iter()
        .filter_map(|candidate| {
            db.name_of(candidate.item).map(|name| Identified {
                item: candidate.item,
                name: name.to_string(),
                votes: candidate.votes,
                offset: candidate.offset,
            })
        })
        .collect()
}

/// Reads a sample through `source` and identifies it with the settings in
/// `config`, keeping at most `config.limit` results.
pub fn identify_file(
    db: &Database,
    source: &impl PeakTupleSource,
    sample: &Path,
    config: &MatchConfig,
) -> Result<Vec<Identified>, SourceError> {
    let tuples = source.peak_tuples(sample)?;
    let mut results = identify(db, &tuples, config.fuzz_factor);
    if let Some(limit) = config.limit {
        results.truncate(limit);
    }

    match results.first() {
        Some(best) => info!(
            "Best match for {}: '{}' with {} votes",
            sample.display(),
            best.name,
            best.votes
        ),
        None => info!("No match for {}", sample.display()),
    }
    Ok(results)
}
