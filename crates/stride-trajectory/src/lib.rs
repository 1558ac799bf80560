//! Time-indexed reference trajectories for walking control.
//!
//! Every reference signal (foot poses, ZMP, CoM) is a [`Function`] of time:
//!
//! 1. **[`Polynomial`]** / **[`Constant`]**: closed-form segments produced by
//!    the footstep and gait planners
//! 2. **[`PiecewiseFunction`]**: segments stitched into one trajectory, each
//!    valid up to its upper bound
//!
//! Evaluating outside a trajectory's domain yields a
//! [`DomainError`](stride_core::error::DomainError) rather than an
//! extrapolated value.

pub mod func;
pub mod piecewise;
pub mod polynomial;

pub use func::{FuncValue, Function};
pub use piecewise::PiecewiseFunction;
pub use polynomial::{
    Constant, ConstantPolynomial, CubicPolynomial, LinearPolynomial, Polynomial,
    QuadraticPolynomial,
};
