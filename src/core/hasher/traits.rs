//! Trait definitions for perceptual fingerprinting.

use super::fast_decode::FastDecoder;
use super::fingerprint::Fingerprint;
use crate::error::HashError;
use image::DynamicImage;
use std::path::Path;

/// A computed perceptual hash that can be compared
pub trait PerceptualHash: Clone + Send + Sync {
    /// Hamming distance: number of differing bits
    fn distance(&self, other: &Self) -> u32;

    /// Get the raw hash bytes
    fn as_bytes(&self) -> &[u8];

    /// Get the hash as a hexadecimal string
    fn to_hex(&self) -> String {
        self.as_bytes()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    /// Total number of meaningful bits
    fn bit_count(&self) -> u32 {
        (self.as_bytes().len() * 8) as u32
    }

    /// Normalized similarity in `[0, 1]`: `(L - distance) / L`
    fn similarity(&self, other: &Self) -> f64 {
        let max_distance = self.bit_count();
        if max_distance == 0 {
            return 1.0;
        }
        let distance = self.distance(other);
        f64::from(max_distance - distance) / f64::from(max_distance)
    }
}

/// Turns images into fingerprints
pub trait HashAlgorithm: Send + Sync {
    /// Fingerprint an already-decoded image
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError>;

    /// Number of bits every fingerprint from this algorithm has
    fn bit_len(&self) -> usize;

    /// Decode a file and fingerprint it.
    ///
    /// Any failure is reported against `path`, so callers can skip the file
    /// and keep going.
    fn hash_file(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let image = FastDecoder::decode(path)?;

        if image.width() == 0 || image.height() == 0 {
            return Err(HashError::EmptyImage {
                path: path.to_path_buf(),
            });
        }

        self.hash_image(&image).map_err(|e| match e {
            HashError::ComputationFailed(reason) => HashError::DecodeError {
                path: path.to_path_buf(),
                reason,
            },
            other => other,
        })
    }
}
