//! Seeded randomness for property-style tests.

use std::ops::Range;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `ChaCha8Rng` seeded from `seed`, so randomized tests replay identically.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// `N` polynomial coefficients drawn uniformly from `range`.
pub fn random_coefficients<const N: usize>(rng: &mut impl Rng, range: Range<f64>) -> [f64; N] {
    std::array::from_fn(|_| rng.gen_range(range.clone()))
}

/// `count` increasing sample times in `[start, end]`, both ends included.
pub fn sorted_times(rng: &mut impl Rng, start: f64, end: f64, count: usize) -> Vec<f64> {
    let mut times: Vec<f64> = (0..count).map(|_| rng.gen_range(start..=end)).collect();
    times.sort_by(f64::total_cmp);
    times
}
