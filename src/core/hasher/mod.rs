//! # Hasher Module
//!
//! Turns image files into fixed-length perceptual fingerprints.
//!
//! ## How It Works
//! 1. Decode the file (zune-jpeg for JPEG, image crate otherwise)
//! 2. Convert to grayscale and resize to (hash_size+1) x hash_size (Lanczos3)
//! 3. Compare horizontal neighbours to get hash_size² bits (dHash)
//! 4. Compare fingerprints with Hamming distance
//!
//! ## Example
//! ```rust,ignore
//! use near_dup_finder::core::hasher::HasherConfig;
//!
//! let hasher = HasherConfig::new().hash_size(16).build()?;
//! let fingerprint = hasher.hash_file(&path)?;
//! ```

mod difference;
pub mod fast_decode;
pub mod fast_resize;
mod fingerprint;
mod traits;

pub use difference::DifferenceHasher;
pub use fingerprint::Fingerprint;
pub use traits::{HashAlgorithm, PerceptualHash};

use crate::error::ConfigError;

/// Largest accepted hash size (65,536-bit fingerprints)
pub const MAX_HASH_SIZE: u32 = 256;

/// Whether `size` is a usable dHash grid side
pub fn is_valid_hash_size(size: u32) -> bool {
    (1..=MAX_HASH_SIZE).contains(&size)
}

/// Configuration builder for hashers
#[derive(Debug, Clone)]
pub struct HasherConfig {
    /// Side length of the dHash grid; fingerprints have hash_size² bits
    hash_size: u32,
}

impl HasherConfig {
    /// Create a new hasher configuration (hash size 16, 256 bits)
    pub fn new() -> Self {
        Self { hash_size: 16 }
    }

    /// Set the hash size.
    ///
    /// - 8: 64 bits, tolerant, more false candidates
    /// - 16: 256 bits, the default
    /// - 32: 1024 bits, strict, slower
    pub fn hash_size(mut self, size: u32) -> Self {
        self.hash_size = size;
        self
    }

    /// Build the hasher
    pub fn build(self) -> Result<Box<dyn HashAlgorithm>, ConfigError> {
        if !is_valid_hash_size(self.hash_size) {
            return Err(ConfigError::InvalidHashSize {
                value: self.hash_size,
            });
        }
        Ok(Box::new(DifferenceHasher::new(self.hash_size)))
    }
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self::new()
    }
}
