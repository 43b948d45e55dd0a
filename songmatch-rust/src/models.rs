use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;

use crate::error::FingerprintError;

/// Position of a peak tuple within its source sequence, in analysis windows.
pub type WindowOffset = u32;

/// Packed, quantized encoding of one peak tuple.
pub type FingerprintHashKey = u64;

/// Exclusive upper bound of each peak tuple component.
///
/// The hash packs components with decimal weights 1, 1e2, 1e5 and 1e8; these
/// bounds keep every field below the weight of the next one.
pub const FIELD_LIMITS: [u64; 4] = [100, 1_000, 1_000, 1 << 32];

/// Dominant frequency-bin index in each of the four analysis bands for a
/// single window, lowest band first.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "[u32; 4]", into = "[u32; 4]")]
pub struct PeakTuple([u32; 4]);

impl PeakTuple {
    pub fn new(components: [u32; 4]) -> Result<Self, FingerprintError> {
        for (index, (&value, &limit)) in components.iter().zip(FIELD_LIMITS.iter()).enumerate() {
            if u64::from(value) >= limit {
                return Err(FingerprintError::ComponentOutOfRange {
                    index,
                    value,
                    limit,
                });
            }
        }
        Ok(PeakTuple(components))
    }

    pub fn components(&self) -> [u32; 4] {
        self.0
    }
}

impl TryFrom<[u32; 4]> for PeakTuple {
    type Error = FingerprintError;

    fn try_from(components: [u32; 4]) -> Result<Self, Self::Error> {
        PeakTuple::new(components)
    }
}

impl From<PeakTuple> for [u32; 4] {
    fn from(tuple: PeakTuple) -> Self {
        tuple.0
    }
}

/// Quantization granularity applied to every tuple component before hashing.
///
/// A query must be indexed with the same factor the database was built with.
/// Nothing checks this; a mismatch only shows up as poor match quality.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(try_from = "u32", into = "u32")]
pub struct FuzzFactor(NonZeroU32);

impl FuzzFactor {
    pub fn new(value: u32) -> Result<Self, FingerprintError> {
        NonZeroU32::new(value)
            .map(FuzzFactor)
            .ok_or(FingerprintError::ZeroFuzzFactor)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for FuzzFactor {
    fn default() -> Self {
        FuzzFactor(NonZeroU32::MIN.saturating_add(1))
    }
}

impl TryFrom<u32> for FuzzFactor {
    type Error = FingerprintError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        FuzzFactor::new(value)
    }
}

impl From<FuzzFactor> for u32 {
    fn from(fuzz: FuzzFactor) -> Self {
        fuzz.get()
    }
}

/// Identifier of a registered library item.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One occurrence of a hash key: which item produced it, and at which window.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PostingEntry {
    pub item: ItemId,
    pub offset: WindowOffset,
}

/// A ranked match for a query.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub item: ItemId,
    /// Height of the tallest bucket in the item's offset histogram.
    pub votes: u32,
    /// Library offset minus sample offset of that bucket, in windows.
    pub offset: i64,
}

/// A candidate resolved to its registered name.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Identified {
    pub item: ItemId,
    pub name: String,
    pub votes: u32,
    pub offset: i64,
}
