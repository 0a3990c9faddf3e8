//! Difference Hash (dHash) implementation.
//!
//! 1. Convert to grayscale and resize to (hash_size+1) x hash_size
//! 2. In every row, compare each pixel with its right-hand neighbour
//! 3. Set the bit when the right neighbour is brighter
//!
//! That yields hash_size bits per row and hash_size² bits in total, in
//! row-major order. The hash follows brightness gradients, so it survives
//! re-encoding and uniform rescaling but changes with the picture's
//! structure.

use super::fast_resize::FastResizer;
use super::fingerprint::Fingerprint;
use super::traits::HashAlgorithm;
use crate::error::HashError;
use image::DynamicImage;

/// Difference Hash (dHash) fingerprinting
#[derive(Debug, Clone, Copy)]
pub struct DifferenceHasher {
    hash_size: u32,
}

impl DifferenceHasher {
    /// Create a hasher producing `hash_size²`-bit fingerprints
    pub fn new(hash_size: u32) -> Self {
        Self { hash_size }
    }

    /// Side length of the comparison grid
    pub fn hash_size(&self) -> u32 {
        self.hash_size
    }
}

impl HashAlgorithm for DifferenceHasher {
    fn hash_image(&self, image: &DynamicImage) -> Result<Fingerprint, HashError> {
        let size = self.hash_size;
        let width = size
            .checked_add(1)
            .ok_or_else(|| HashError::ComputationFailed(format!("hash size {} too large", size)))?;
        let gray = FastResizer::new().resize_to_grayscale(image, width, size)?;

        let bits = (0..size).flat_map(|y| {
            let gray = &gray;
            (0..size).map(move |x| gray.get_pixel(x + 1, y)[0] > gray.get_pixel(x, y)[0])
        });

        Ok(Fingerprint::from_bits(bits))
    }

    fn bit_len(&self) -> usize {
        (self.hash_size as usize).pow(2)
    }
}
