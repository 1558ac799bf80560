//! Time-indexed function abstraction.

use std::fmt::Debug;
use std::ops::{Add, Mul};

use num_traits::Zero;
use stride_core::error::DomainError;

/// Value type a [`Function`] can produce.
///
/// Anything with addition, scaling by `f64` and a zero element: `f64` itself
/// and fixed-size `nalgebra` vectors such as `Vector2<f64>` or `Vector3<f64>`.
pub trait FuncValue:
    Clone + Debug + Zero + Add<Output = Self> + Mul<f64, Output = Self> + Send + Sync + 'static
{
}

impl<T> FuncValue for T where
    T: Clone + Debug + Zero + Add<Output = T> + Mul<f64, Output = T> + Send + Sync + 'static
{
}

/// Scalar or vector valued function of time with a domain of validity.
///
/// Implementations are immutable once built, so evaluation is a pure function
/// of `t` and safe to share across threads.
pub trait Function<T: FuncValue>: Debug + Send + Sync {
    /// Function value at `t`.
    fn evaluate(&self, t: f64) -> Result<T, DomainError>;

    /// `order`-th derivative at `t`. Order 0 is the value itself.
    fn derivative(&self, t: f64, order: usize) -> Result<T, DomainError>;

    /// Lower limit of the domain.
    fn domain_lower_limit(&self) -> f64 {
        f64::NEG_INFINITY
    }

    /// Upper limit of the domain.
    fn domain_upper_limit(&self) -> f64 {
        f64::INFINITY
    }
}
