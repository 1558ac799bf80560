//! Reference trajectories for a straight walk.

use std::sync::Arc;

use nalgebra::Vector3;
use stride_trajectory::{Constant, LinearPolynomial, PiecewiseFunction};

use crate::config::WalkConfig;

/// ZMP and CoM references of one walk.
#[derive(Debug, Clone)]
pub struct WalkReference {
    pub zmp: PiecewiseFunction<Vector3<f64>>,
    pub com: PiecewiseFunction<Vector3<f64>>,
    /// Time at which the robot stands still again after the last step.
    pub end_time: f64,
}

/// Build the references of a straight walk starting at `t = 0` with both
/// feet at `x = 0`.
///
/// The ZMP rests between the feet, shifts onto the support foot at the start
/// of every step and returns between the feet after the last one. The CoM
/// reference follows the support foot along `x` at `com_height`. Both
/// references stay defined `margin` seconds past `end_time` so a horizon
/// starting at `end_time` can still be planned.
pub fn build_walk_reference(walk: &WalkConfig, com_height: f64, margin: f64) -> WalkReference {
    let half_width = 0.5 * walk.step_width;
    let mut zmp_keys = Vec::new();
    let mut com_keys = Vec::new();

    // Step i swings the right foot when i is even; the other foot supports.
    for i in 0..walk.step_count {
        let t = walk.settle_duration + f64::from(i) * walk.step_duration;
        let x = f64::from(i) * walk.step_length;
        let y = if i % 2 == 0 { half_width } else { -half_width };
        zmp_keys.push((t, Vector3::new(x, y, 0.0)));
        com_keys.push((t, Vector3::new(x, 0.0, com_height)));
    }

    let last_step_end = walk.settle_duration + f64::from(walk.step_count) * walk.step_duration;
    if walk.step_count > 0 {
        let mid_x = (f64::from(walk.step_count) - 0.5) * walk.step_length;
        zmp_keys.push((last_step_end, Vector3::new(mid_x, 0.0, 0.0)));
        com_keys.push((last_step_end, Vector3::new(mid_x, 0.0, com_height)));
    }

    let end_time = last_step_end + walk.transfer_duration + walk.settle_duration;
    let t_final = end_time + margin;
    WalkReference {
        zmp: ramps(Vector3::zeros(), &zmp_keys, walk.transfer_duration, t_final),
        com: ramps(
            Vector3::new(0.0, 0.0, com_height),
            &com_keys,
            walk.transfer_duration,
            t_final,
        ),
        end_time,
    }
}

/// Hold `initial`, then at each key time ramp linearly to the key value over
/// `transfer` seconds and hold it; defined on `[0, t_final]`.
fn ramps(
    initial: Vector3<f64>,
    keys: &[(f64, Vector3<f64>)],
    transfer: f64,
    t_final: f64,
) -> PiecewiseFunction<Vector3<f64>> {
    let mut reference = PiecewiseFunction::new();
    reference.set_domain_lower_limit(0.0);

    let mut current = initial;
    for &(t, target) in keys {
        reference.append(t, Arc::new(Constant::new(current)));
        reference.append(
            t + transfer,
            Arc::new(LinearPolynomial::interpolate(t, current, t + transfer, target)),
        );
        current = target;
    }
    reference.append(t_final, Arc::new(Constant::new(current)));
    reference
}
