//! Physical constants.

/// Standard gravitational acceleration in m/s^2.
pub const GRAVITY: f64 = 9.80665;
