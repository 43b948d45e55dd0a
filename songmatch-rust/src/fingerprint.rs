use crate::models::{FingerprintHashKey, FuzzFactor, PeakTuple};

/// Positional weight of each tuple component in the packed key.
///
/// Each weight exceeds the largest value the lower fields can sum to, given
/// the bounds in [`crate::models::FIELD_LIMITS`].
const FIELD_WEIGHTS: [u64; 4] = [1, 100, 100_000, 100_000_000];

/// Turns peak tuples into hash keys.
///
/// # Hash Structure
/// Every component is floored to a multiple of the fuzz factor, then packed
/// with decimal weights:
/// - band 0 * 1
/// - band 1 * 1e2
/// - band 2 * 1e5
/// - band 3 * 1e8
///
/// Flooring makes the key tolerant to small peak jitter between a clean
/// library recording and a noisy query: tuples whose components fall in the
/// same fuzz bucket share a key. A larger fuzz factor finds more candidates
/// and more false votes.
#[derive(Clone, Copy, Debug, Default)]
pub struct FingerprintHasher {
    fuzz: FuzzFactor,
}

impl FingerprintHasher {
    pub fn new(fuzz: FuzzFactor) -> Self {
        FingerprintHasher { fuzz }
    }

    pub fn fuzz_factor(&self) -> FuzzFactor {
        self.fuzz
    }

    pub fn hash(&self, tuple: &PeakTuple) -> FingerprintHashKey {
        hash_tuple(tuple, self.fuzz)
    }

    /// Hashes a whole sequence, keeping window order.
    pub fn hash_all<'a>(
        &'a self,
        tuples: &'a [PeakTuple],
    ) -> impl Iterator<Item = FingerprintHashKey> + 'a {
        tuples.iter().map(move |tuple| self.hash(tuple))
    }
}

/// Quantizes and packs a single peak tuple.
pub fn hash_tuple(tuple: &PeakTuple, fuzz: FuzzFactor) -> FingerprintHashKey {
    let fuzz = u64::from(fuzz.get());
    tuple
        .components()
        .iter()
        .zip(FIELD_WEIGHTS)
        .map(|(&component, weight)| {
            let component = u64::from(component);
            (component - component % fuzz) * weight
        })
        .sum()
}
