//! Scores candidate pairs on their full fingerprints.

use super::{CandidatePair, ComparisonStrategy, NearDuplicate};
use crate::core::hasher::{Fingerprint, PerceptualHash};
use std::cmp::Ordering;
use std::path::PathBuf;

/// Applies a [`ComparisonStrategy`] to candidate pairs
pub struct SimilarityScorer<'a> {
    strategy: &'a dyn ComparisonStrategy,
}

impl<'a> SimilarityScorer<'a> {
    /// Create a scorer for the given strategy
    pub fn new(strategy: &'a dyn ComparisonStrategy) -> Self {
        Self { strategy }
    }

    /// Score `candidates` (indices into `photos`) and keep the near-duplicates.
    ///
    /// The result is sorted by descending similarity, ties in canonical
    /// pair order, independent of the order candidates arrive in.
    pub fn score<I>(&self, photos: &[(PathBuf, Fingerprint)], candidates: I) -> Vec<NearDuplicate>
    where
        I: IntoIterator<Item = CandidatePair>,
    {
        let mut matches: Vec<NearDuplicate> = candidates
            .into_iter()
            .filter_map(|pair| {
                let (path_a, hash_a) = &photos[pair.a];
                let (path_b, hash_b) = &photos[pair.b];

                let similarity = hash_a.similarity(hash_b);
                if !self.strategy.is_near_duplicate(similarity) {
                    return None;
                }

                Some(NearDuplicate::new(
                    path_a.clone(),
                    path_b.clone(),
                    hash_a.distance(hash_b),
                    similarity,
                ))
            })
            .collect();

        matches.sort_by(compare_ranked);
        matches
    }
}

/// Descending similarity, then canonical `(path_a, path_b)` order
pub(crate) fn compare_ranked(x: &NearDuplicate, y: &NearDuplicate) -> Ordering {
    y.similarity
        .total_cmp(&x.similarity)
        .then_with(|| x.path_a.as_os_str().cmp(y.path_a.as_os_str()))
        .then_with(|| x.path_b.as_os_str().cmp(y.path_b.as_os_str()))
}
