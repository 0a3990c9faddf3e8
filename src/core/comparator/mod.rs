//! # Comparator Module
//!
//! Finds near-duplicates among fingerprinted photos.
//!
//! ## How It Works
//! 1. Bucket fingerprints into LSH bands to get candidate pairs
//! 2. Score each candidate on the full fingerprint (Hamming similarity)
//! 3. Keep pairs strictly above the threshold
//! 4. Group kept pairs into clusters (transitive grouping)
//!
//! ## Similarity
//! `similarity = (bits - hamming_distance) / bits`, so identical
//! fingerprints score 1.0 and fully inverted ones score 0.0.

mod grouper;
mod lsh;
mod scorer;
mod traits;

pub use grouper::{DisjointSet, TransitiveGrouper};
pub use lsh::{LshConfig, LshIndex, LshIndexStats};
pub use scorer::SimilarityScorer;
pub use traits::{ComparisonStrategy, ThresholdStrategy};

use crate::core::hasher::Fingerprint;
use crate::events::{CompareEvent, Event, EventSender};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Two photo indices sharing an LSH bucket, stored as `(smaller, larger)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidatePair {
    pub a: usize,
    pub b: usize,
}

impl CandidatePair {
    /// Canonicalize an unordered pair
    pub fn new(x: usize, y: usize) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }
}

/// A pair of photos whose fingerprints are close enough to report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearDuplicate {
    /// Path-order smaller photo
    pub path_a: PathBuf,
    /// Path-order larger photo
    pub path_b: PathBuf,
    /// Hamming distance between the fingerprints
    pub distance: u32,
    /// Fraction of agreeing bits, in `[0, 1]`
    pub similarity: f64,
}

impl NearDuplicate {
    /// Create a match, putting the paths in canonical order
    pub fn new(x: PathBuf, y: PathBuf, distance: u32, similarity: f64) -> Self {
        let (path_a, path_b) = if x.as_os_str() <= y.as_os_str() {
            (x, y)
        } else {
            (y, x)
        };
        Self {
            path_a,
            path_b,
            distance,
            similarity,
        }
    }

    /// `(path_a, path_b, similarity)`
    pub fn as_triple(&self) -> (&Path, &Path, f64) {
        (&self.path_a, &self.path_b, self.similarity)
    }

    /// Whether either side of the pair is `path`
    pub fn involves(&self, path: &Path) -> bool {
        self.path_a == path || self.path_b == path
    }
}

/// A cluster of photos connected through near-duplicate pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Members, sorted by path; always at least two
    pub photos: Vec<PathBuf>,
    /// Mean similarity over the pairs that formed the group
    pub average_similarity: f64,
    /// Number of near-duplicate pairs inside the group
    pub pair_count: usize,
}

impl DuplicateGroup {
    /// Number of photos in the group
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Groups are never empty; provided for API symmetry
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Whether `path` is a member
    pub fn contains(&self, path: &Path) -> bool {
        self.photos.iter().any(|p| p == path)
    }
}

/// Banded candidate search plus exact scoring over `photos`.
///
/// Returns the sorted near-duplicates and the index statistics.
pub fn find_near_duplicate_pairs(
    photos: Vec<(PathBuf, Fingerprint)>,
    strategy: &dyn ComparisonStrategy,
    lsh: LshConfig,
) -> Result<(Vec<NearDuplicate>, LshIndexStats), ConfigError> {
    find_near_duplicate_pairs_with_events(photos, strategy, lsh, &crate::events::null_sender())
}

/// Same as [`find_near_duplicate_pairs`], reporting progress as events
pub fn find_near_duplicate_pairs_with_events(
    photos: Vec<(PathBuf, Fingerprint)>,
    strategy: &dyn ComparisonStrategy,
    lsh: LshConfig,
    events: &EventSender,
) -> Result<(Vec<NearDuplicate>, LshIndexStats), ConfigError> {
    let index = LshIndex::build(lsh, photos)?;
    let candidates = index.find_candidates();
    let stats = index.stats(&candidates);

    debug!(
        photos = stats.total_photos,
        candidates = stats.candidate_pairs,
        naive = stats.naive_comparisons,
        "LSH candidate search complete"
    );
    events.send(Event::Compare(CompareEvent::CandidatesFound {
        candidate_pairs: stats.candidate_pairs,
        naive_comparisons: stats.naive_comparisons,
    }));

    let matches = SimilarityScorer::new(strategy).score(index.photos(), candidates);

    events.send(Event::Compare(CompareEvent::Scored {
        near_duplicates: matches.len(),
    }));

    Ok((matches, stats))
}
