//! # Locality-Sensitive Hashing (LSH) Index
//!
//! Narrows all-pairs comparison down to a small candidate set.
//!
//! ## How It Works
//! 1. Split each fingerprint into `bands` slices of `rows = bits / bands` bits
//! 2. Per band, bucket images by the exact bits of their slice
//! 3. Images sharing a bucket in ANY band become a candidate pair
//! 4. Only candidates are scored on the full fingerprint
//!
//! Bits past `bands * rows` are not part of any band when the fingerprint
//! length is not a multiple of `bands`. They still count when scoring.
//!
//! ## Trade-offs
//! - More bands (fewer rows each) = higher recall, more false candidates
//! - Fewer bands (more rows each) = fewer candidates, may miss pairs

use super::CandidatePair;
use crate::core::hasher::Fingerprint;
use crate::error::ConfigError;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use tracing::warn;

/// LSH index configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LshConfig {
    /// Number of bands to divide each fingerprint into
    pub bands: usize,
}

impl Default for LshConfig {
    fn default() -> Self {
        Self { bands: 16 }
    }
}

impl LshConfig {
    /// Create a new LSH configuration
    pub fn new(bands: usize) -> Self {
        Self { bands }
    }

    /// Bits per band for fingerprints of `bit_len` bits.
    ///
    /// Fails when a band would be empty, since an empty band puts every
    /// image into one bucket.
    pub fn rows_for(&self, bit_len: usize) -> Result<usize, ConfigError> {
        if self.bands == 0 || self.bands > bit_len {
            return Err(ConfigError::InvalidBands {
                bands: self.bands,
                bits: bit_len,
            });
        }
        Ok(bit_len / self.bands)
    }

    /// Bits excluded from banding for fingerprints of `bit_len` bits
    pub fn trailing_bits(&self, bit_len: usize) -> usize {
        match self.rows_for(bit_len) {
            Ok(rows) => bit_len - rows * self.bands,
            Err(_) => 0,
        }
    }
}

/// Bucket key: the band's bits packed into bytes
type BandKey = Vec<u8>;

/// LSH index over a fixed set of fingerprints
pub struct LshIndex {
    config: LshConfig,
    /// Bits per band
    rows: usize,
    /// band_index -> (band bits -> photo indices, ascending)
    band_tables: Vec<HashMap<BandKey, Vec<usize>>>,
    /// Indexed photos, sorted by path so index order is path order
    photos: Vec<(PathBuf, Fingerprint)>,
}

impl LshIndex {
    /// Bucket every fingerprint into every band.
    ///
    /// All fingerprints must have the same length.
    pub fn build(
        config: LshConfig,
        mut photos: Vec<(PathBuf, Fingerprint)>,
    ) -> Result<Self, ConfigError> {
        photos.sort_by(|a, b| a.0.as_os_str().cmp(b.0.as_os_str()));

        let mut band_tables: Vec<HashMap<BandKey, Vec<usize>>> =
            (0..config.bands).map(|_| HashMap::new()).collect();

        let rows = match photos.first() {
            Some((_, first)) => {
                let bit_len = first.bit_len();
                let rows = config.rows_for(bit_len)?;
                let trailing = config.trailing_bits(bit_len);
                if trailing > 0 {
                    warn!(
                        bits = bit_len,
                        bands = config.bands,
                        trailing,
                        "fingerprint length is not a multiple of the band count; trailing bits are not banded"
                    );
                }
                rows
            }
            None => 0,
        };

        for (photo_idx, (_, fingerprint)) in photos.iter().enumerate() {
            debug_assert_eq!(fingerprint.bit_len(), photos[0].1.bit_len());

            for (band_idx, table) in band_tables.iter_mut().enumerate() {
                let key = fingerprint.band_key(band_idx * rows, rows);
                table.entry(key).or_default().push(photo_idx);
            }
        }

        Ok(Self {
            config,
            rows,
            band_tables,
            photos,
        })
    }

    /// Unordered pairs sharing at least one bucket, each exactly once.
    ///
    /// Pairs are `(smaller, larger)` photo indices, which is also path
    /// order, and the set iterates in that canonical order.
    pub fn find_candidates(&self) -> BTreeSet<CandidatePair> {
        let mut candidates = BTreeSet::new();

        for table in &self.band_tables {
            for bucket in table.values().filter(|b| b.len() > 1) {
                for (i, &a) in bucket.iter().enumerate() {
                    for &b in &bucket[i + 1..] {
                        debug_assert!(a < b);
                        candidates.insert(CandidatePair::new(a, b));
                    }
                }
            }
        }

        candidates
    }

    /// Bits per band
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of band tables
    pub fn bands(&self) -> usize {
        self.config.bands
    }

    /// Members of one bucket: photo indices sharing `key` in band `band`
    #[cfg(test)]
    pub(crate) fn bucket(&self, band: usize, key: &[u8]) -> Option<&[usize]> {
        self.band_tables
            .get(band)
            .and_then(|t| t.get(key))
            .map(|v| v.as_slice())
    }

    /// Get the number of indexed photos
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Indexed photos in path order
    pub fn photos(&self) -> &[(PathBuf, Fingerprint)] {
        &self.photos
    }

    /// Get statistics about the index and the candidates it produced
    pub fn stats(&self, candidates: &BTreeSet<CandidatePair>) -> LshIndexStats {
        let total_buckets: usize = self.band_tables.iter().map(|t| t.len()).sum();
        let max_bucket_size = self
            .band_tables
            .iter()
            .flat_map(|t| t.values())
            .map(|v| v.len())
            .max()
            .unwrap_or(0);

        let n = self.photos.len();
        let naive_comparisons = n * n.saturating_sub(1) / 2;
        let candidate_pairs = candidates.len();
        let reduction_factor = if candidate_pairs > 0 {
            naive_comparisons as f64 / candidate_pairs as f64
        } else {
            naive_comparisons as f64
        };

        LshIndexStats {
            total_photos: n,
            bands: self.config.bands,
            rows: self.rows,
            total_buckets,
            max_bucket_size,
            candidate_pairs,
            naive_comparisons,
            reduction_factor,
        }
    }
}

/// Statistics about the LSH index
#[derive(Debug, Clone, serde::Serialize)]
pub struct LshIndexStats {
    /// Number of photos indexed
    pub total_photos: usize,
    /// Number of bands
    pub bands: usize,
    /// Bits per band
    pub rows: usize,
    /// Total number of buckets across all bands
    pub total_buckets: usize,
    /// Largest bucket
    pub max_bucket_size: usize,
    /// Number of distinct candidate pairs
    pub candidate_pairs: usize,
    /// Number of comparisons in the all-pairs approach
    pub naive_comparisons: usize,
    /// naive / candidates
    pub reduction_factor: f64,
}

impl std::fmt::Display for LshIndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LSH index: {} photos, {} bands ({} bits each), {} candidate pairs ({}x reduction from {})",
            self.total_photos,
            self.bands,
            self.rows,
            self.candidate_pairs,
            self.reduction_factor as u64,
            self.naive_comparisons
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(pattern: &str) -> Fingerprint {
        Fingerprint::from_bits(pattern.chars().map(|c| c == '1'))
    }

    fn photo(name: &str, pattern: &str) -> (PathBuf, Fingerprint) {
        (PathBuf::from(name), fp(pattern))
    }

    #[test]
    fn empty_index() {
        let index = LshIndex::build(LshConfig::new(4), Vec::new()).unwrap();
        assert!(index.is_empty());
        assert!(index.find_candidates().is_empty());
    }

    #[test]
    fn single_photo_no_candidates() {
        let index = LshIndex::build(LshConfig::new(4), vec![photo("/a.png", "11111111")]).unwrap();
        assert_eq!(index.len(), 1);
        assert!(index.find_candidates().is_empty());
    }

    #[test]
    fn rows_is_floor_of_bits_over_bands() {
        let config = LshConfig::new(3);
        assert_eq!(config.rows_for(64), Ok(21));
        assert_eq!(config.trailing_bits(64), 1);
        assert_eq!(LshConfig::new(8).trailing_bits(64), 0);
    }

    #[test]
    fn zero_width_bands_are_rejected() {
        assert!(LshConfig::new(65).rows_for(64).is_err());
        assert!(LshConfig::new(0).rows_for(64).is_err());

        let result = LshIndex::build(LshConfig::new(9), vec![photo("/a.png", "11110000")]);
        assert!(result.is_err());
    }

    #[test]
    fn buckets_are_keyed_per_band() {
        let index = LshIndex::build(
            LshConfig::new(2),
            vec![photo("/a.png", "11110000"), photo("/b.png", "11111111")],
        )
        .unwrap();

        assert_eq!(index.rows(), 4);
        // Same first band, different second band
        assert_eq!(index.bucket(0, &[0b1111_0000]), Some(&[0usize, 1][..]));
        assert_eq!(index.bucket(1, &[0b0000_0000]), Some(&[0usize][..]));
        assert_eq!(index.bucket(1, &[0b1111_0000]), Some(&[1usize][..]));
    }

    #[test]
    fn same_bits_in_different_bands_do_not_collide() {
        // a's band 0 equals b's band 1, which must not make them candidates
        let index = LshIndex::build(
            LshConfig::new(2),
            vec![photo("/a.png", "10100000"), photo("/b.png", "11111010")],
        )
        .unwrap();

        assert!(index.find_candidates().is_empty());
    }

    #[test]
    fn one_bit_difference_still_shares_a_band() {
        let index = LshIndex::build(
            LshConfig::new(4),
            vec![
                photo("/a.png", "1111111111111111"),
                photo("/b.png", "1111111111111110"),
            ],
        )
        .unwrap();

        assert_eq!(index.find_candidates().len(), 1);
    }

    #[test]
    fn very_different_fingerprints_are_not_candidates() {
        let index = LshIndex::build(
            LshConfig::new(4),
            vec![
                photo("/a.png", "1111111111111111"),
                photo("/b.png", "0000000000000000"),
            ],
        )
        .unwrap();

        assert!(index.find_candidates().is_empty());
    }

    #[test]
    fn pair_in_many_bands_is_emitted_once() {
        // Identical fingerprints share all 4 bands
        let index = LshIndex::build(
            LshConfig::new(4),
            vec![photo("/b.png", "1010101010101010"), photo("/a.png", "1010101010101010")],
        )
        .unwrap();

        let candidates: Vec<_> = index.find_candidates().into_iter().collect();
        assert_eq!(candidates, vec![CandidatePair::new(0, 1)]);
    }

    #[test]
    fn candidates_are_in_path_order() {
        let index = LshIndex::build(
            LshConfig::new(2),
            vec![
                photo("/z.png", "11110000"),
                photo("/m.png", "11110000"),
                photo("/a.png", "11110000"),
            ],
        )
        .unwrap();

        for pair in index.find_candidates() {
            let (a, b) = (&index.photos()[pair.a].0, &index.photos()[pair.b].0);
            assert!(a.as_os_str() < b.as_os_str());
        }
        assert_eq!(index.photos()[0].0, PathBuf::from("/a.png"));
    }

    #[test]
    fn large_bucket_yields_all_pairs() {
        let photos = (0..5)
            .map(|i| photo(&format!("/{}.png", i), "1100110011001100"))
            .collect();
        let index = LshIndex::build(LshConfig::new(4), photos).unwrap();

        assert_eq!(index.find_candidates().len(), 10);
    }

    #[test]
    fn stats_shows_reduction() {
        let photos = (0..10u8)
            .map(|i| {
                let bits = (0..16).map(|b| (i >> (b % 4)) & 1 == 1);
                (PathBuf::from(format!("/{}.png", i)), Fingerprint::from_bits(bits))
            })
            .collect();
        let index = LshIndex::build(LshConfig::new(4), photos).unwrap();

        let stats = index.stats(&index.find_candidates());
        assert_eq!(stats.total_photos, 10);
        assert_eq!(stats.naive_comparisons, 45);
        assert_eq!(stats.rows, 4);
        assert!(stats.to_string().contains("10 photos"));
    }
}
