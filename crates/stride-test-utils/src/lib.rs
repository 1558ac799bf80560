//! Shared test fixtures and utilities for stride crates.
//!
//! Provides deterministic RNG setup and ready-made reference trajectories
//! for exercising the centroidal manager.

pub mod reference;
pub mod rng;

// ---------------------------------------------------------------------------
// Re-exports for convenience
// ---------------------------------------------------------------------------

pub use reference::{constant_zmp_reference, shifting_zmp_reference};
pub use rng::{random_coefficients, seeded_rng, sorted_times};
