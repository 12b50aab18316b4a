//! Degree and index selection following the Ideal Soliton distribution.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use rand_xoshiro::rand_core::RngCore;

use crate::xoshiro::{next_below, next_double};

/// Probability of drawing `degree` out of `k` slices.
#[allow(clippy::cast_precision_loss)]
fn probability(degree: usize, k: usize) -> f64 {
    if degree == 1 {
        1.0 / k as f64
    } else {
        1.0 / (degree as f64 * (degree - 1) as f64)
    }
}

/// Draws a degree in `[1, k]`.
///
/// Scans the cumulative distribution for the first bucket that exceeds a
/// uniform draw. The probabilities only sum to one up to rounding, so a draw
/// left unmatched saturates to `k`.
pub fn sample_degree<R: RngCore + ?Sized>(k: usize, rng: &mut R) -> usize {
    debug_assert!(k >= 1, "at least one slice is required");
    let draw = next_double(rng);
    let mut cumulative = 0.0;
    for degree in 1..k {
        cumulative += probability(degree, k);
        if cumulative > draw {
            return degree;
        }
    }
    k.max(1)
}

/// Draws `degree` distinct indices in `[0, k)`, returned in ascending order.
pub fn sample_indices<R: RngCore + ?Sized>(k: usize, degree: usize, rng: &mut R) -> Vec<usize> {
    debug_assert!(degree >= 1 && degree <= k, "degree {degree} out of [1, {k}]");
    let degree = degree.min(k);
    let mut chosen = BTreeSet::new();
    while chosen.len() < degree {
        chosen.insert(next_below(rng, k));
    }
    chosen.into_iter().collect()
}

/// Precomputed Ideal Soliton distribution over `k` slices.
///
/// Draws are identical to [`sample_degree`] for the same random input, but
/// locate the bucket by binary search instead of a linear scan.
#[derive(Debug, Clone)]
pub struct IdealSoliton {
    cumulative: Vec<f64>,
}

impl IdealSoliton {
    #[must_use]
    pub fn new(k: usize) -> Self {
        let mut total = 0.0;
        let cumulative = (1..k)
            .map(|degree| {
                total += probability(degree, k);
                total
            })
            .collect();
        Self { cumulative }
    }

    /// Number of slices the distribution ranges over.
    #[must_use]
    pub fn k(&self) -> usize {
        self.cumulative.len() + 1
    }

    pub fn sample<R: RngCore + ?Sized>(&self, rng: &mut R) -> usize {
        let draw = next_double(rng);
        self.cumulative.partition_point(|&c| c <= draw) + 1
    }
}
