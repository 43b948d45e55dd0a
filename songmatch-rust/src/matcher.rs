use rayon::prelude::*;
use std::cmp::Reverse;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::index::FingerprintIndex;
use crate::models::{Candidate, FingerprintHashKey, ItemId, WindowOffset};
use crate::registry::Registry;
use crate::sample::SamplePostings;

/// Votes per item, bucketed by library offset minus sample offset.
type OffsetHistogram = HashMap<ItemId, HashMap<i64, u32>>;

/// Ranks library items by how consistently they align with the sample.
///
/// # Voting
/// 1. Every sample key is looked up in the index; unknown keys are skipped
/// 2. Every (posting, sample offset) pair votes for its item at
///    `library_offset - sample_offset`
/// 3. An item scores the height of its tallest bucket
///
/// A true match piles its votes into a single delta. Incidental collisions
/// scatter over many deltas and stay low.
///
/// Items without any vote are left out, so a sample that shares no key with
/// the library yields an empty list. Ties in score go to the lower item id,
/// ties between buckets of one item to the smaller delta.
pub fn rank(
    index: &FingerprintIndex,
    sample: &SamplePostings,
    registry: &Registry,
) -> Vec<Candidate> {
    let mut histogram = OffsetHistogram::new();
    for (key, offsets) in sample.iter() {
        vote(&mut histogram, index, registry, key, offsets);
    }
    finish(histogram, sample)
}

/// Same result as [`rank`], with the sample keys spread over the rayon pool.
///
/// Each worker fills its own histogram; they are merged once at the end.
pub fn rank_parallel(
    index: &FingerprintIndex,
    sample: &SamplePostings,
    registry: &Registry,
) -> Vec<Candidate> {
    let histogram = sample
        .entries()
        .into_par_iter()
        .fold(OffsetHistogram::new, |mut histogram, (key, offsets)| {
            vote(&mut histogram, index, registry, key, offsets);
            histogram
        })
        .reduce(OffsetHistogram::new, merge);
    finish(histogram, sample)
}

fn vote(
    histogram: &mut OffsetHistogram,
    index: &FingerprintIndex,
    registry: &Registry,
    key: FingerprintHashKey,
    sample_offsets: &[WindowOffset],
) {
    for posting in index.lookup(key) {
        if !registry.contains(posting.item) {
            warn!("Skipping posting of unregistered item {}", posting.item);
            continue;
        }
        let buckets = histogram.entry(posting.item).or_default();
        for &sample_offset in sample_offsets {
            let delta = i64::from(posting.offset) - i64::from(sample_offset);
            *buckets.entry(delta).or_default() += 1;
        }
    }
}

fn merge(mut into: OffsetHistogram, from: OffsetHistogram) -> OffsetHistogram {
    for (item, buckets) in from {
        let target = into.entry(item).or_default();
        for (delta, votes) in buckets {
            *target.entry(delta).or_default() += votes;
        }
    }
    into
}

fn finish(histogram: OffsetHistogram, sample: &SamplePostings) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = histogram
        .into_iter()
        .filter_map(|(item, buckets)| {
            buckets
                .into_iter()
                .max_by_key(|&(delta, votes)| (votes, Reverse(delta)))
                .map(|(offset, votes)| Candidate {
                    item,
                    votes,
                    offset,
                })
        })
        .collect();

    candidates.sort_by(|a, b| b.votes.cmp(&a.votes).then(a.item.cmp(&b.item)));

    debug!(
        "Matched {} sample keys against {} candidate items",
        sample.len(),
        candidates.len()
    );
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::models::{FuzzFactor, PeakTuple};
    use crate::sample::SampleIndexer;
    use crate::storage::Database;

    fn tuples(components: &[[u32; 4]]) -> Vec<PeakTuple> {
        components
            .iter()
            .map(|&c| PeakTuple::new(c).unwrap())
            .collect()
    }

    fn database(fuzz: FuzzFactor, items: &[(u32, &[[u32; 4]])]) -> Database {
        let mut builder = IndexBuilder::new(fuzz);
        for (id, components) in items {
            builder
                .register(ItemId(*id), &format!("item-{id}"), &tuples(components))
                .unwrap();
        }
        builder.finish()
    }

    fn query(db: &Database, fuzz: FuzzFactor, components: &[[u32; 4]]) -> Vec<Candidate> {
        let sample = SampleIndexer::new(fuzz).index(&tuples(components));
        rank(db.index(), &sample, db.registry())
    }

    #[test]
    fn aligned_sample_peaks_at_zero_delta() {
        let fuzz = FuzzFactor::new(2).unwrap();
        let a: &[[u32; 4]] = &[[1, 1, 1, 1], [2, 2, 2, 2], [3, 3, 3, 3]];
        let b: &[[u32; 4]] = &[[9, 9, 9, 9], [8, 8, 8, 8]];
        let db = database(fuzz, &[(1, a), (2, b)]);

        let ranked = query(&db, fuzz, a);
        assert_eq!(
            ranked,
            vec![Candidate {
                item: ItemId(1),
                votes: 3,
                offset: 0,
            }]
        );
    }

    #[test]
    fn reports_the_offset_of_a_sample_cut_from_the_middle() {
        let fuzz = FuzzFactor::new(1).unwrap();
        let song: Vec<[u32; 4]> = (0..20).map(|i| [i, i + 1, i + 2, i + 3]).collect();
        let db = database(fuzz, &[(4, song.as_slice())]);

        let ranked = query(&db, fuzz, &song[7..12]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].votes, 5);
        assert_eq!(ranked[0].offset, 7);
    }

    #[test]
    fn consistent_alignment_beats_scattered_collisions() {
        let fuzz = FuzzFactor::new(1).unwrap();
        let aligned: &[[u32; 4]] = &[[1, 0, 0, 0], [2, 0, 0, 0], [3, 0, 0, 0]];
        // Same tuples as the sample, reordered so only two of them line up.
        let scattered: &[[u32; 4]] = &[[3, 0, 0, 0], [5, 0, 0, 0], [1, 0, 0, 0], [2, 0, 0, 0]];
        let db = database(fuzz, &[(9, scattered), (10, aligned)]);

        let ranked = query(&db, fuzz, aligned);
        assert_eq!(ranked[0].item, ItemId(10));
        assert_eq!(ranked[0].votes, 3);
        assert_eq!(ranked[1].item, ItemId(9));
        assert_eq!(ranked[1].votes, 2);
    }

    #[test]
    fn equal_scores_rank_lower_id_first() {
        let fuzz = FuzzFactor::new(1).unwrap();
        let shared: &[[u32; 4]] = &[[4, 4, 4, 4], [5, 5, 5, 5]];
        let db = database(fuzz, &[(30, shared), (3, shared), (17, shared)]);

        let ids: Vec<_> = query(&db, fuzz, shared).iter().map(|c| c.item).collect();
        assert_eq!(ids, vec![ItemId(3), ItemId(17), ItemId(30)]);
    }

    #[test]
    fn bucket_ties_pick_the_smallest_delta() {
        let fuzz = FuzzFactor::new(1).unwrap();
        let song: &[[u32; 4]] = &[[1, 1, 1, 1], [2, 2, 2, 2]];
        let db = database(fuzz, &[(1, song)]);

        let mut sample = vec![[0, 0, 0, 0]; 9];
        sample[3] = [1, 1, 1, 1];
        sample[8] = [2, 2, 2, 2];

        // One vote each, at deltas -3 and -7.
        let ranked = query(&db, fuzz, &sample);
        assert_eq!(
            ranked,
            vec![Candidate {
                item: ItemId(1),
                votes: 1,
                offset: -7,
            }]
        );
    }

    #[test]
    fn no_shared_keys_means_no_candidates() {
        let fuzz = FuzzFactor::new(2).unwrap();
        let song: &[[u32; 4]] = &[[10, 10, 10, 10]];
        let db = database(fuzz, &[(1, song)]);
        assert!(query(&db, fuzz, &[[50, 50, 50, 50]]).is_empty());
        assert!(query(&db, fuzz, &[]).is_empty());
    }

    #[test]
    fn parallel_ranking_matches_sequential() {
        let fuzz = FuzzFactor::new(3).unwrap();
        let first: Vec<[u32; 4]> = (0..60).map(|i| [i % 90, (i * 7) % 900, (i * 13) % 900, i]).collect();
        let second: Vec<[u32; 4]> = (0..60).map(|i| [(i * 3) % 90, (i * 5) % 900, i, i % 4]).collect();
        let db = database(fuzz, &[(1, first.as_slice()), (2, second.as_slice())]);

        let sample = SampleIndexer::new(fuzz).index(&tuples(&first[10..40]));
        assert_eq!(
            rank(db.index(), &sample, db.registry()),
            rank_parallel(db.index(), &sample, db.registry())
        );
    }
}
