//! Bit-packed fingerprint storage.

use super::traits::PerceptualHash;
use serde::{Deserialize, Serialize};

/// A fixed-length perceptual fingerprint.
///
/// Bits are packed MSB-first; unused bits of the last byte are always zero,
/// so byte-wise XOR popcount equals the Hamming distance over `bit_len` bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl Fingerprint {
    /// Pack a row-major bit sequence
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut bytes = Vec::new();
        let mut bit_len = 0;

        for bit in bits {
            if bit_len % 8 == 0 {
                bytes.push(0);
            }
            if bit {
                if let Some(last) = bytes.last_mut() {
                    *last |= 1 << (7 - bit_len % 8);
                }
            }
            bit_len += 1;
        }

        Self { bytes, bit_len }
    }

    /// Number of meaningful bits
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Read bit `index` (row-major position)
    pub fn bit(&self, index: usize) -> bool {
        debug_assert!(index < self.bit_len);
        self.bytes[index / 8] & (1 << (7 - index % 8)) != 0
    }

    /// Iterate over all bits in order
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.bit_len).map(move |i| self.bit(i))
    }

    /// Re-pack bits `[start, start + len)` into a fixed-width byte key.
    ///
    /// Keys of equal `len` have equal width, so two slices share a key
    /// exactly when their bits are identical.
    pub fn band_key(&self, start: usize, len: usize) -> Vec<u8> {
        let mut key = vec![0u8; len.div_ceil(8)];
        for offset in 0..len {
            if self.bit(start + offset) {
                key[offset / 8] |= 1 << (7 - offset % 8);
            }
        }
        key
    }
}

impl PerceptualHash for Fingerprint {
    fn distance(&self, other: &Self) -> u32 {
        debug_assert_eq!(self.bit_len, other.bit_len);
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn bit_count(&self) -> u32 {
        self.bit_len as u32
    }
}
