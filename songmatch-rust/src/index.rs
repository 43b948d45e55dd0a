use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::error::DatabaseError;
use crate::fingerprint::FingerprintHasher;
use crate::models::{FingerprintHashKey, FuzzFactor, ItemId, PeakTuple, PostingEntry};
use crate::registry::Registry;
use crate::storage::Database;

/// Posting lists of every hash key seen across the library.
///
/// Only [`IndexBuilder`] can add to an index; once built it is read-only.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct FingerprintIndex {
    postings: HashMap<FingerprintHashKey, Vec<PostingEntry>>,
}

impl FingerprintIndex {
    /// Occurrences of `key`. A key that was never registered has none.
    pub fn lookup(&self, key: FingerprintHashKey) -> &[PostingEntry] {
        self.postings.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct hash keys.
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    /// Total number of posting entries over all keys.
    pub fn posting_count(&self) -> usize {
        self.postings.values().map(Vec::len).sum()
    }

    pub(crate) fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.postings.values().flatten().map(|entry| entry.item)
    }

    fn append(&mut self, key: FingerprintHashKey, entry: PostingEntry) {
        self.postings.entry(key).or_default().push(entry);
    }
}

/// Accumulates library items into a [`FingerprintIndex`] and its [`Registry`].
///
/// Ids handed out by [`IndexBuilder::add`] come from a counter that starts at
/// 1 and always moves past the largest id registered so far.
#[derive(Debug)]
pub struct IndexBuilder {
    hasher: FingerprintHasher,
    index: FingerprintIndex,
    registry: Registry,
    next_id: u32,
}

impl IndexBuilder {
    pub fn new(fuzz: FuzzFactor) -> Self {
        IndexBuilder {
            hasher: FingerprintHasher::new(fuzz),
            index: FingerprintIndex::default(),
            registry: Registry::new(),
            next_id: 1,
        }
    }

    /// Registers `tuples` under `item`.
    ///
    /// Registering an id or a name twice fails and leaves the builder
    /// untouched; callers are expected to abandon the build.
    pub fn register(
        &mut self,
        item: ItemId,
        name: &str,
        tuples: &[PeakTuple],
    ) -> Result<(), DatabaseError> {
        self.registry.insert(item, name)?;
        for (offset, key) in (0..).zip(self.hasher.hash_all(tuples)) {
            self.index.append(key, PostingEntry { item, offset });
        }
        self.next_id = self.next_id.max(item.0.saturating_add(1));
        info!("Registered '{}' as {} with {} windows", name, item, tuples.len());
        Ok(())
    }

    /// Registers `tuples` under a freshly allocated id.
    pub fn add(&mut self, name: &str, tuples: &[PeakTuple]) -> Result<ItemId, DatabaseError> {
        let item = ItemId(self.next_id);
        self.register(item, name, tuples)?;
        Ok(item)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Freezes the index.
    pub fn finish(self) -> Database {
        info!(
            "Built index of {} items, {} keys, {} postings",
            self.registry.len(),
            self.index.len(),
            self.index.posting_count()
        );
        Database::from_parts(self.registry, self.index)
    }
}
