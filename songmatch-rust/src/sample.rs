use std::collections::HashMap;

use crate::fingerprint::FingerprintHasher;
use crate::models::{FingerprintHashKey, FuzzFactor, PeakTuple, WindowOffset};

/// Window offsets of every hash key in a single query.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SamplePostings {
    offsets: HashMap<FingerprintHashKey, Vec<WindowOffset>>,
}

impl SamplePostings {
    pub fn get(&self, key: FingerprintHashKey) -> &[WindowOffset] {
        self.offsets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (FingerprintHashKey, &[WindowOffset])> {
        self.offsets.iter().map(|(key, offsets)| (*key, offsets.as_slice()))
    }

    pub(crate) fn entries(&self) -> Vec<(FingerprintHashKey, &[WindowOffset])> {
        self.iter().collect()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Indexes query samples with the hasher used for the library.
///
/// The fuzz factor must be the one the database was built with.
#[derive(Clone, Copy, Debug, Default)]
pub struct SampleIndexer {
    hasher: FingerprintHasher,
}

impl SampleIndexer {
    pub fn new(fuzz: FuzzFactor) -> Self {
        SampleIndexer {
            hasher: FingerprintHasher::new(fuzz),
        }
    }

    pub fn index(&self, tuples: &[PeakTuple]) -> SamplePostings {
        let mut offsets: HashMap<FingerprintHashKey, Vec<WindowOffset>> = HashMap::new();
        for (offset, key) in (0..).zip(self.hasher.hash_all(tuples)) {
            offsets.entry(key).or_default().push(offset);
        }
        SamplePostings { offsets }
    }
}
