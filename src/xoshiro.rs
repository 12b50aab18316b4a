//! Seedable randomness source for block streams.
//!
//! Any [`RngCore`] drives the sampler; [`Xoshiro256`] additionally derives its
//! state from the SHA-256 of a seed, so a stream can be reproduced from a
//! string or a byte slice.

use bitcoin_hashes::Hash;
use rand_xoshiro::rand_core::{self, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone)]
pub struct Xoshiro256 {
    inner: Xoshiro256StarStar,
}

impl From<Xoshiro256StarStar> for Xoshiro256 {
    fn from(from: Xoshiro256StarStar) -> Self {
        Self { inner: from }
    }
}

impl From<&[u8]> for Xoshiro256 {
    fn from(from: &[u8]) -> Self {
        let hash = bitcoin_hashes::sha256::Hash::hash(from);
        Self::from(hash.to_byte_array())
    }
}

impl From<&str> for Xoshiro256 {
    fn from(value: &str) -> Self {
        Self::from(value.as_bytes())
    }
}

impl From<[u8; 32]> for Xoshiro256 {
    fn from(value: [u8; 32]) -> Self {
        // The digest is read as four big-endian words; the generator takes
        // little-endian ones.
        let mut s = [0_u8; 32];
        for (word, chunk) in s.chunks_exact_mut(8).zip(value.chunks_exact(8)) {
            let mut v = [0_u8; 8];
            v.copy_from_slice(chunk);
            word.copy_from_slice(&u64::from_be_bytes(v).to_le_bytes());
        }
        Xoshiro256StarStar::from_seed(s).into()
    }
}

impl RngCore for Xoshiro256 {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// Uniform draw in `[0, 1)` from any generator, built from the top 53 bits
/// of one `u64` so it is never rounded up to `1.0`.
#[allow(clippy::cast_precision_loss)]
pub fn next_double<R: RngCore + ?Sized>(rng: &mut R) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1_u64 << 53) as f64)
}

/// Uniform integer in `[0, bound)`; `bound` must be positive.
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_sign_loss)]
pub fn next_below<R: RngCore + ?Sized>(rng: &mut R, bound: usize) -> usize {
    // Rounding can push the product up to `bound` for draws just below 1.
    ((next_double(rng) * bound as f64) as usize).min(bound - 1)
}

#[cfg(test)]
#[allow(clippy::cast_possible_truncation)]
#[allow(clippy::cast_precision_loss)]
#[allow(clippy::cast_sign_loss)]
impl Xoshiro256 {
    pub(crate) fn next(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Uniform integer in `[low, high]`.
    pub(crate) fn next_int(&mut self, low: u64, high: u64) -> u64 {
        (next_double(self) * ((high - low + 1) as f64)) as u64 + low
    }

    pub(crate) fn next_bytes(&mut self, n: usize) -> alloc::vec::Vec<u8> {
        (0..n).map(|_| self.next_int(0, 255) as u8).collect()
    }
}
