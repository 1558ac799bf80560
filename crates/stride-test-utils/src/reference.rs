//! Reference trajectory fixtures.

use std::sync::Arc;

use nalgebra::Vector3;
use stride_trajectory::{Constant, LinearPolynomial, PiecewiseFunction};

/// ZMP reference holding `zmp` over `[t_start, t_end]`.
pub fn constant_zmp_reference(
    zmp: Vector3<f64>,
    t_start: f64,
    t_end: f64,
) -> PiecewiseFunction<Vector3<f64>> {
    let mut reference = PiecewiseFunction::new();
    reference.set_domain_lower_limit(t_start);
    reference.append(t_end, Arc::new(Constant::new(zmp)));
    reference
}

/// ZMP reference that holds `from` until `t_shift`, moves linearly to `to`
/// over `shift_duration`, then holds `to` until `t_end`.
pub fn shifting_zmp_reference(
    from: Vector3<f64>,
    to: Vector3<f64>,
    t_start: f64,
    t_shift: f64,
    shift_duration: f64,
    t_end: f64,
) -> PiecewiseFunction<Vector3<f64>> {
    let mut reference = PiecewiseFunction::new();
    reference.set_domain_lower_limit(t_start);
    reference.append(t_shift, Arc::new(Constant::new(from)));
    reference.append(
        t_shift + shift_duration,
        Arc::new(LinearPolynomial::interpolate(
            t_shift,
            from,
            t_shift + shift_duration,
            to,
        )),
    );
    reference.append(t_end, Arc::new(Constant::new(to)));
    reference
}
