//! DDP planner for the ZMP-based centroidal model.
//!
//! Solves the finite-horizon optimal control problem with iLQR
//! (Gauss-Newton DDP: second-order cost terms, first-order dynamics).
//!
//! # Model
//!
//! State `x = [c_x, c_y, c_z, v_x, v_y, v_z]`, input `u = [zmp_x, zmp_y, f_z]`.
//! The CoM is pushed away from the ZMP along the line joining them:
//!
//! ```text
//! c'     = v
//! v_xy'  = f_z / (m c_z) * (c_xy - zmp_xy)
//! v_z'   = f_z / m - g
//! ```
//!
//! discretized with forward Euler at the horizon step.
//!
//! # Cost
//!
//! ```text
//! running:  w_zmp |zmp - zmp_ref|^2 + w_fz (f_z - m g)^2 + w_cz (c_z - c_z_ref)^2 + w_vz v_z^2
//! terminal: w_cz_T (c_z - c_z_ref)^2 + w_v_T |v|^2
//! ```
//!
//! (each term halved).

use std::time::Instant;

use nalgebra::{Matrix3, Vector2};
use stride_core::config::DdpWeights;
use stride_core::constants::GRAVITY;
use stride_core::error::{ControlError, StrideError};

use crate::planner::{RefFn, ZmpPlanner};
use crate::types::{
    FeedbackGain, InitialParam, InputMatrix, InputVector, PlannedData, RefData, SolveStats,
    StateMatrix, StateVector,
};

/// Initial Levenberg regularization added to `Q_uu`.
const LAMBDA_INIT: f64 = 1e-6;
const LAMBDA_MIN: f64 = 1e-9;
const LAMBDA_MAX: f64 = 1e10;
const LAMBDA_FACTOR: f64 = 10.0;

/// Step sizes tried by the forward-pass line search.
const LINE_SEARCH_ALPHAS: [f64; 6] = [1.0, 0.5, 0.25, 0.125, 0.0625, 0.03125];

/// Converged once the largest feed-forward correction drops below this.
const FEEDFORWARD_TOL: f64 = 1e-6;
/// Converged once an accepted step improves the cost by less than this
/// fraction.
const RELATIVE_COST_TOL: f64 = 1e-8;

/// Quadratic expansion of a stage cost.
struct CostDerivatives {
    lx: StateVector,
    lu: InputVector,
    lxx: StateMatrix,
    luu: Matrix3<f64>,
}

/// Feed-forward and feedback terms from one backward pass.
struct Gains {
    k: Vec<InputVector>,
    gain: Vec<FeedbackGain>,
}

impl Gains {
    fn max_feedforward(&self) -> f64 {
        self.k.iter().map(|k| k.amax()).fold(0.0, f64::max)
    }
}

/// DDP (iLQR) ZMP planner.
#[derive(Clone, Debug)]
pub struct DdpZmp {
    weights: DdpWeights,
    mass: f64,
    dt: f64,
    horizon_steps: usize,
    max_iter: u32,
    last_stats: Option<SolveStats>,
}

impl DdpZmp {
    /// Create an unconfigured planner; call [`ZmpPlanner::configure`] before
    /// planning.
    pub fn new(weights: DdpWeights) -> Self {
        Self {
            weights,
            mass: 0.0,
            dt: 0.0,
            horizon_steps: 0,
            max_iter: 0,
            last_stats: None,
        }
    }

    /// Access the cost weights.
    pub const fn weights(&self) -> &DdpWeights {
        &self.weights
    }

    /// One step of the discrete dynamics.
    pub fn dynamics(&self, x: &StateVector, u: &InputVector) -> StateVector {
        let dt = self.dt;
        let omega2 = u[2] / (self.mass * x[2]);
        let mut next = *x;
        next[0] += dt * x[3];
        next[1] += dt * x[4];
        next[2] += dt * x[5];
        next[3] += dt * omega2 * (x[0] - u[0]);
        next[4] += dt * omega2 * (x[1] - u[1]);
        next[5] += dt * (u[2] / self.mass - GRAVITY);
        next
    }

    /// Jacobians of [`dynamics`](Self::dynamics) with respect to state and input.
    fn dynamics_jacobians(&self, x: &StateVector, u: &InputVector) -> (StateMatrix, InputMatrix) {
        let dt = self.dt;
        let m = self.mass;
        let cz = x[2];
        let omega2 = u[2] / (m * cz);

        let mut a = StateMatrix::identity();
        a[(0, 3)] = dt;
        a[(1, 4)] = dt;
        a[(2, 5)] = dt;
        for axis in 0..2 {
            let offset = x[axis] - u[axis];
            a[(3 + axis, axis)] = dt * omega2;
            a[(3 + axis, 2)] = -dt * omega2 * offset / cz;
        }

        let mut b = InputMatrix::zeros();
        for axis in 0..2 {
            let offset = x[axis] - u[axis];
            b[(3 + axis, axis)] = -dt * omega2;
            b[(3 + axis, 2)] = dt * offset / (m * cz);
        }
        b[(5, 2)] = dt / m;

        (a, b)
    }

    fn running_cost(&self, x: &StateVector, u: &InputVector, r: &RefData) -> f64 {
        let w = &self.weights;
        let zmp_err = Vector2::new(u[0] - r.zmp.x, u[1] - r.zmp.y);
        let force_err = u[2] - self.mass * GRAVITY;
        let height_err = x[2] - r.com_z;
        0.5 * (w.running_zmp * zmp_err.norm_squared()
            + w.running_force_z * force_err * force_err
            + w.running_com_z * height_err * height_err
            + w.running_vel_z * x[5] * x[5])
    }

    fn running_cost_derivatives(&self, x: &StateVector, u: &InputVector, r: &RefData) -> CostDerivatives {
        let w = &self.weights;

        let mut lx = StateVector::zeros();
        lx[2] = w.running_com_z * (x[2] - r.com_z);
        lx[5] = w.running_vel_z * x[5];
        let mut lxx = StateMatrix::zeros();
        lxx[(2, 2)] = w.running_com_z;
        lxx[(5, 5)] = w.running_vel_z;

        let lu = InputVector::new(
            w.running_zmp * (u[0] - r.zmp.x),
            w.running_zmp * (u[1] - r.zmp.y),
            w.running_force_z * (u[2] - self.mass * GRAVITY),
        );
        let luu = Matrix3::from_diagonal(&InputVector::new(
            w.running_zmp,
            w.running_zmp,
            w.running_force_z,
        ));

        CostDerivatives { lx, lu, lxx, luu }
    }

    fn terminal_cost(&self, x: &StateVector, r: &RefData) -> f64 {
        let w = &self.weights;
        let height_err = x[2] - r.com_z;
        let vel = x.fixed_rows::<3>(3);
        0.5 * (w.terminal_com_z * height_err * height_err + w.terminal_vel * vel.norm_squared())
    }

    fn terminal_cost_derivatives(&self, x: &StateVector, r: &RefData) -> (StateVector, StateMatrix) {
        let w = &self.weights;
        let mut lx = StateVector::zeros();
        let mut lxx = StateMatrix::zeros();
        lx[2] = w.terminal_com_z * (x[2] - r.com_z);
        lxx[(2, 2)] = w.terminal_com_z;
        for i in 3..6 {
            lx[i] = w.terminal_vel * x[i];
            lxx[(i, i)] = w.terminal_vel;
        }
        (lx, lxx)
    }

    /// Simulate the input sequence from `x0`; returns `u_list.len() + 1` states.
    fn rollout(&self, x0: &StateVector, u_list: &[InputVector]) -> Vec<StateVector> {
        let mut x_list = Vec::with_capacity(u_list.len() + 1);
        x_list.push(*x0);
        for (i, u) in u_list.iter().enumerate() {
            let next = self.dynamics(&x_list[i], u);
            x_list.push(next);
        }
        x_list
    }

    fn total_cost(&self, x_list: &[StateVector], u_list: &[InputVector], refs: &[RefData]) -> f64 {
        let n = u_list.len();
        let running: f64 = (0..n)
            .map(|i| self.running_cost(&x_list[i], &u_list[i], &refs[i]))
            .sum();
        running + self.terminal_cost(&x_list[n], &refs[n])
    }

    /// Backward pass at regularization `lambda`. `None` when `Q_uu` is not
    /// positive definite somewhere along the horizon.
    fn backward_pass(
        &self,
        x_list: &[StateVector],
        u_list: &[InputVector],
        refs: &[RefData],
        lambda: f64,
    ) -> Option<Gains> {
        let n = u_list.len();
        let (mut vx, mut vxx) = self.terminal_cost_derivatives(&x_list[n], &refs[n]);
        let mut k_list = vec![InputVector::zeros(); n];
        let mut gain_list = vec![FeedbackGain::zeros(); n];

        for i in (0..n).rev() {
            let (a, b) = self.dynamics_jacobians(&x_list[i], &u_list[i]);
            let d = self.running_cost_derivatives(&x_list[i], &u_list[i], &refs[i]);

            let qx = d.lx + a.transpose() * vx;
            let qu = d.lu + b.transpose() * vx;
            let qxx = d.lxx + a.transpose() * vxx * a;
            let quu = d.luu + b.transpose() * vxx * b;
            let qux = b.transpose() * vxx * a;

            let chol = (quu + Matrix3::identity() * lambda).cholesky()?;
            let k = -chol.solve(&qu);
            let gain = -chol.solve(&qux);

            vx = qx + gain.transpose() * quu * k + gain.transpose() * qu + qux.transpose() * k;
            vxx = qxx + gain.transpose() * quu * gain + gain.transpose() * qux + qux.transpose() * gain;
            vxx = (vxx + vxx.transpose()) * 0.5;

            k_list[i] = k;
            gain_list[i] = gain;
        }

        Some(Gains {
            k: k_list,
            gain: gain_list,
        })
    }

    /// Apply the gains with feed-forward step `alpha` and re-simulate.
    fn forward_pass(
        &self,
        x_list: &[StateVector],
        u_list: &[InputVector],
        gains: &Gains,
        alpha: f64,
    ) -> (Vec<StateVector>, Vec<InputVector>) {
        let n = u_list.len();
        let mut x_new = Vec::with_capacity(n + 1);
        let mut u_new = Vec::with_capacity(n);
        x_new.push(x_list[0]);
        for i in 0..n {
            let dx = x_new[i] - x_list[i];
            let u = u_list[i] + gains.k[i] * alpha + gains.gain[i] * dx;
            let next = self.dynamics(&x_new[i], &u);
            u_new.push(u);
            x_new.push(next);
        }
        (x_new, u_new)
    }
}

impl ZmpPlanner for DdpZmp {
    fn configure(&mut self, mass: f64, horizon_dt: f64, horizon_steps: usize, max_iter: u32) {
        self.mass = mass;
        self.dt = horizon_dt;
        self.horizon_steps = horizon_steps;
        self.max_iter = max_iter;
        self.last_stats = None;
    }

    #[allow(clippy::cast_precision_loss)]
    fn plan_once(
        &mut self,
        ref_fn: &RefFn<'_>,
        initial: &InitialParam,
        t: f64,
    ) -> Result<PlannedData, StrideError> {
        let start = Instant::now();
        let n = self.horizon_steps;

        if initial.u_list.len() != n {
            return Err(ControlError::WarmStartMismatch {
                expected: n,
                got: initial.u_list.len(),
            }
            .into());
        }

        // Sample the reference at every node, terminal included.
        let refs = (0..=n)
            .map(|i| ref_fn(t + i as f64 * self.dt))
            .collect::<Result<Vec<_>, _>>()?;

        let x0 = initial.to_state_vector();
        let mut u_list = initial.u_list.clone();
        let mut x_list = self.rollout(&x0, &u_list);
        let mut cost = self.total_cost(&x_list, &u_list, &refs);
        let initial_cost = cost;

        let mut lambda = LAMBDA_INIT;
        let mut converged = false;
        let mut iter = 0;

        'outer: while iter < self.max_iter {
            iter += 1;

            let gains = loop {
                if let Some(gains) = self.backward_pass(&x_list, &u_list, &refs, lambda) {
                    break gains;
                }
                lambda *= LAMBDA_FACTOR;
                if lambda > LAMBDA_MAX {
                    break 'outer;
                }
            };

            if gains.max_feedforward() < FEEDFORWARD_TOL {
                converged = true;
                break;
            }

            let mut accepted = false;
            for alpha in LINE_SEARCH_ALPHAS {
                let (x_new, u_new) = self.forward_pass(&x_list, &u_list, &gains, alpha);
                let new_cost = self.total_cost(&x_new, &u_new, &refs);
                if new_cost < cost {
                    converged = cost - new_cost < RELATIVE_COST_TOL * cost;
                    x_list = x_new;
                    u_list = u_new;
                    cost = new_cost;
                    accepted = true;
                    break;
                }
            }

            if accepted {
                lambda = (lambda / LAMBDA_FACTOR).max(LAMBDA_MIN);
                if converged {
                    break;
                }
            } else {
                lambda *= LAMBDA_FACTOR;
                if lambda > LAMBDA_MAX {
                    break;
                }
            }
        }

        let stats = SolveStats {
            iter,
            converged,
            solve_time_us: u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            initial_cost,
            final_cost: cost,
        };
        self.last_stats = Some(stats);

        let first = u_list.first().copied().unwrap_or_else(InputVector::zeros);
        Ok(PlannedData {
            zmp: Vector2::new(first[0], first[1]),
            force_z: first[2],
            u_list,
            x_list,
            stats,
        })
    }

    fn horizon_steps(&self) -> usize {
        self.horizon_steps
    }

    fn stats(&self) -> Option<&SolveStats> {
        self.last_stats.as_ref()
    }
}
