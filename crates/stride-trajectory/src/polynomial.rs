//! Fixed-order polynomials of time.
//!
//! A polynomial with `N` coefficients has order `N - 1`:
//!
//! ```text
//! p(t) = c_0 + c_1 (t - t0) + c_2 (t - t0)^2 + ... + c_{N-1} (t - t0)^{N-1}
//! ```
//!
//! Coefficients may be any [`FuncValue`], so the same type serves scalar
//! channels and full 3-D positions.

use stride_core::error::DomainError;

use crate::func::{FuncValue, Function};

/// Polynomial with `N` coefficients (order `N - 1`) and argument offset `t0`.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial<T, const N: usize> {
    /// Coefficients from the constant term to the highest order.
    coeff: [T; N],
    /// Offset of the function argument.
    t0: f64,
}

/// Order-0 polynomial data; see [`Constant`] for the function type.
pub type ConstantPolynomial<T> = Polynomial<T, 1>;
/// Order-1 polynomial.
pub type LinearPolynomial<T> = Polynomial<T, 2>;
/// Order-2 polynomial.
pub type QuadraticPolynomial<T> = Polynomial<T, 3>;
/// Order-3 polynomial.
pub type CubicPolynomial<T> = Polynomial<T, 4>;

impl<T: FuncValue, const N: usize> Polynomial<T, N> {
    const HAS_COEFFICIENTS: () = assert!(N > 0, "a polynomial needs at least one coefficient");

    /// Create a polynomial from coefficients (constant term first) and an
    /// argument offset.
    pub fn new(coeff: [T; N], t0: f64) -> Self {
        let () = Self::HAS_COEFFICIENTS;
        Self { coeff, t0 }
    }

    /// Polynomial order.
    pub const fn order(&self) -> usize {
        N - 1
    }

    /// Coefficients from the constant term to the highest order.
    pub const fn coefficients(&self) -> &[T; N] {
        &self.coeff
    }

    /// Argument offset `t0`.
    pub const fn offset(&self) -> f64 {
        self.t0
    }

    /// Value at `t`.
    pub fn value_at(&self, t: f64) -> T {
        self.derivative_at(t, 0)
    }

    /// `order`-th derivative at `t`; zero once `order` exceeds the polynomial
    /// order.
    ///
    /// Evaluated with Horner's scheme on the differentiated coefficients
    /// `c_i * i! / (i - order)!`.
    pub fn derivative_at(&self, t: f64, order: usize) -> T {
        if order >= N {
            return T::zero();
        }

        let dt = t - self.t0;
        let mut ret = self.coeff[N - 1].clone() * falling_factorial(N - 1, order);
        for i in (order..N - 1).rev() {
            ret = ret * dt + self.coeff[i].clone() * falling_factorial(i, order);
        }
        ret
    }
}

impl<T: FuncValue> LinearPolynomial<T> {
    /// Straight line through `(t_start, start)` and `(t_end, end)`, offset at
    /// `t_start`.
    ///
    /// A degenerate interval (`t_end == t_start`) yields the constant `start`.
    pub fn interpolate(t_start: f64, start: T, t_end: f64, end: T) -> Self {
        let duration = t_end - t_start;
        let slope = if duration.abs() > f64::EPSILON {
            (end + start.clone() * -1.0) * (1.0 / duration)
        } else {
            T::zero()
        };
        Self::new([start, slope], t_start)
    }
}

impl<T: FuncValue, const N: usize> Function<T> for Polynomial<T, N> {
    fn evaluate(&self, t: f64) -> Result<T, DomainError> {
        Ok(self.value_at(t))
    }

    fn derivative(&self, t: f64, order: usize) -> Result<T, DomainError> {
        Ok(self.derivative_at(t, order))
    }
}

/// `i * (i - 1) * ... * (i - order + 1)` as `f64`; 1 for `order == 0`.
#[allow(clippy::cast_precision_loss)]
fn falling_factorial(i: usize, order: usize) -> f64 {
    ((i + 1 - order)..=i).fold(1.0, |acc, k| acc * k as f64)
}

// ---------------------------------------------------------------------------
// Constant
// ---------------------------------------------------------------------------

/// Constant function: an order-0 polynomial whose value ignores `t`.
#[derive(Clone, Debug, PartialEq)]
pub struct Constant<T>(ConstantPolynomial<T>);

impl<T: FuncValue> Constant<T> {
    pub fn new(value: T) -> Self {
        Self(Polynomial::new([value], 0.0))
    }

    /// The constant value.
    pub fn value(&self) -> &T {
        &self.0.coefficients()[0]
    }
}

impl<T: FuncValue> From<Constant<T>> for ConstantPolynomial<T> {
    fn from(constant: Constant<T>) -> Self {
        constant.0
    }
}

impl<T: FuncValue> Function<T> for Constant<T> {
    fn evaluate(&self, _t: f64) -> Result<T, DomainError> {
        Ok(self.value().clone())
    }

    fn derivative(&self, t: f64, order: usize) -> Result<T, DomainError> {
        Ok(self.0.derivative_at(t, order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use rand::Rng;
    use stride_test_utils::{random_coefficients, seeded_rng};

    #[test]
    fn linear_value_and_slope() {
        let p = LinearPolynomial::new([2.0, 3.0], 0.0);
        assert_eq!(p.order(), 1);
        for t in [-1.0, 0.0, 0.5, 4.0] {
            assert_relative_eq!(p.value_at(t), 2.0 + 3.0 * t, epsilon = 1e-12);
            assert_relative_eq!(p.derivative_at(t, 1), 3.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn offset_shifts_argument() {
        // 1 + 2 (t - 1) + 3 (t - 1)^2 at t = 3: 1 + 4 + 12 = 17
        let p = QuadraticPolynomial::new([1.0, 2.0, 3.0], 1.0);
        assert_relative_eq!(p.value_at(3.0), 17.0, epsilon = 1e-12);
        // 2 + 6 (t - 1) = 14
        assert_relative_eq!(p.derivative_at(3.0, 1), 14.0, epsilon = 1e-12);
        assert_relative_eq!(p.derivative_at(3.0, 2), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn cubic_derivatives() {
        // p = t^3: p' = 3t^2, p'' = 6t, p''' = 6
        let p = CubicPolynomial::new([0.0, 0.0, 0.0, 1.0], 0.0);
        assert_relative_eq!(p.value_at(2.0), 8.0, epsilon = 1e-12);
        assert_relative_eq!(p.derivative_at(2.0, 1), 12.0, epsilon = 1e-12);
        assert_relative_eq!(p.derivative_at(2.0, 2), 12.0, epsilon = 1e-12);
        assert_relative_eq!(p.derivative_at(2.0, 3), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn derivative_beyond_order_is_zero() {
        let p = CubicPolynomial::new([1.0, -2.0, 0.5, 4.0], 0.3);
        for t in [-10.0, 0.0, 0.3, 7.5] {
            assert_eq!(p.derivative_at(t, 4), 0.0);
            assert_eq!(p.derivative_at(t, 9), 0.0);
        }

        let v = LinearPolynomial::new([Vector3::new(1.0, 2.0, 3.0), Vector3::x()], 0.0);
        assert_eq!(v.derivative_at(1.0, 2), Vector3::zeros());
    }

    #[test]
    fn zeroth_derivative_equals_value_random() {
        let mut rng = seeded_rng(7);
        for _ in 0..50 {
            let coeff: [f64; 6] = random_coefficients(&mut rng, -5.0..5.0);
            let t0 = rng.gen_range(-2.0..2.0);
            let p = Polynomial::new(coeff, t0);
            let t = rng.gen_range(-3.0..3.0);
            assert_eq!(p.derivative_at(t, 0), p.value_at(t));
            assert_eq!(p.derivative(t, 0).unwrap(), p.evaluate(t).unwrap());
            assert_eq!(p.derivative_at(t, 6), 0.0);
        }
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let mut rng = seeded_rng(11);
        let h = 1e-6;
        for _ in 0..20 {
            let coeff: [f64; 5] = random_coefficients(&mut rng, -1.0..1.0);
            let p = Polynomial::new(coeff, rng.gen_range(-1.0..1.0));
            let t = rng.gen_range(-1.0..1.0);
            for order in 1..=3 {
                let numeric =
                    (p.derivative_at(t + h, order - 1) - p.derivative_at(t - h, order - 1)) / (2.0 * h);
                assert_relative_eq!(p.derivative_at(t, order), numeric, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn matches_power_sum_definition() {
        let coeff = [0.5, -1.0, 2.0, 0.25];
        let t0 = 0.7;
        let p = Polynomial::new(coeff, t0);
        for t in [-1.0, 0.0, 0.7, 2.0] {
            let dt: f64 = t - t0;
            let expected: f64 = coeff
                .iter()
                .enumerate()
                .map(|(i, c)| c * dt.powi(i32::try_from(i).unwrap()))
                .sum();
            assert_relative_eq!(p.value_at(t), expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn vector_valued_polynomial() {
        let p = LinearPolynomial::new([Vector3::new(0.0, 0.1, 0.8), Vector3::new(0.3, 0.0, 0.0)], 1.0);
        assert_relative_eq!(p.value_at(2.0), Vector3::new(0.3, 0.1, 0.8), epsilon = 1e-12);
        assert_relative_eq!(p.derivative_at(5.0, 1), Vector3::new(0.3, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn interpolate_hits_endpoints() {
        let p = LinearPolynomial::interpolate(1.0, 0.2, 3.0, 0.6);
        assert_relative_eq!(p.value_at(1.0), 0.2, epsilon = 1e-12);
        assert_relative_eq!(p.value_at(3.0), 0.6, epsilon = 1e-12);
        assert_relative_eq!(p.derivative_at(2.0, 1), 0.2, epsilon = 1e-12);

        let v = LinearPolynomial::interpolate(0.0, Vector3::zeros(), 0.5, Vector3::new(0.1, -0.1, 0.0));
        assert_relative_eq!(v.value_at(0.25), Vector3::new(0.05, -0.05, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn interpolate_degenerate_interval_is_constant() {
        let p = LinearPolynomial::interpolate(1.0, 0.4, 1.0, 0.9);
        assert_relative_eq!(p.value_at(5.0), 0.4, epsilon = 1e-12);
    }

    #[test]
    fn constant_ignores_argument() {
        let c = Constant::new(Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(c.evaluate(-100.0).unwrap(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(c.evaluate(100.0).unwrap(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(c.derivative(0.0, 1).unwrap(), Vector3::zeros());
        assert_eq!(c.derivative(0.0, 0).unwrap(), Vector3::new(1.0, 2.0, 3.0));

        let poly: ConstantPolynomial<_> = c.into();
        assert_eq!(poly.order(), 0);
    }

    #[test]
    fn unbounded_default_domain() {
        let p = LinearPolynomial::new([0.0, 1.0], 0.0);
        assert_eq!(p.domain_lower_limit(), f64::NEG_INFINITY);
        assert_eq!(p.domain_upper_limit(), f64::INFINITY);
    }
}
