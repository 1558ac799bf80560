//! Core types exchanged across the planner boundary.

use nalgebra::{SMatrix, SVector, Vector2, Vector3};

/// Number of ZMP-model states: [c(3), v(3)] = 6.
pub const STATE_DIM: usize = 6;

/// Number of ZMP-model inputs: [zmp_x, zmp_y, f_z] = 3.
pub const INPUT_DIM: usize = 3;

/// CoM position and velocity, `[c_x, c_y, c_z, v_x, v_y, v_z]`.
pub type StateVector = SVector<f64, STATE_DIM>;
/// Horizontal ZMP and vertical force, `[zmp_x, zmp_y, f_z]`.
pub type InputVector = SVector<f64, INPUT_DIM>;
/// State Jacobian of the discrete dynamics.
pub type StateMatrix = SMatrix<f64, STATE_DIM, STATE_DIM>;
/// Input Jacobian of the discrete dynamics.
pub type InputMatrix = SMatrix<f64, STATE_DIM, INPUT_DIM>;
/// Feedback gain mapping a state deviation to an input correction.
pub type FeedbackGain = SMatrix<f64, INPUT_DIM, STATE_DIM>;

/// Reference the planner tracks at one instant of the horizon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefData {
    /// Desired horizontal ZMP (meters, world frame).
    pub zmp: Vector2<f64>,
    /// Desired CoM height (meters).
    pub com_z: f64,
}

/// Initial state and warm start for one planning call.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialParam {
    /// CoM position in world frame (meters).
    pub pos: Vector3<f64>,
    /// CoM velocity in world frame (m/s).
    pub vel: Vector3<f64>,
    /// Initial guess of the input sequence, one entry per horizon step.
    pub u_list: Vec<InputVector>,
}

impl InitialParam {
    /// Pack position and velocity into the 6-element state vector.
    pub fn to_state_vector(&self) -> StateVector {
        let mut x = StateVector::zeros();
        x.fixed_rows_mut::<3>(0).copy_from(&self.pos);
        x.fixed_rows_mut::<3>(3).copy_from(&self.vel);
        x
    }

    /// Input that holds the CoM still over its current ground projection:
    /// ZMP under the CoM and `f_z = m g`.
    pub fn steady_state_input(pos: &Vector3<f64>, mass: f64, gravity: f64) -> InputVector {
        InputVector::new(pos.x, pos.y, mass * gravity)
    }
}

/// Result of one planning call.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedData {
    /// First-step horizontal ZMP.
    pub zmp: Vector2<f64>,
    /// First-step vertical force (N).
    pub force_z: f64,
    /// Full planned input sequence over the horizon.
    pub u_list: Vec<InputVector>,
    /// Predicted state sequence, `horizon + 1` entries starting at the
    /// initial state.
    pub x_list: Vec<StateVector>,
    /// Solver diagnostics.
    pub stats: SolveStats,
}

/// Diagnostics of one planning call. Read-only; nothing feeds them back.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SolveStats {
    /// Solver iterations performed.
    pub iter: u32,
    /// Whether the solver met its convergence criterion before the cap.
    pub converged: bool,
    /// Wall-clock solve time in microseconds.
    pub solve_time_us: u64,
    /// Cost of the warm start.
    pub initial_cost: f64,
    /// Cost of the returned plan.
    pub final_cost: f64,
}

/// Command published to the whole-body task layer for the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CentroidalCommand {
    /// Planned ZMP; ground plane, so `z = 0`.
    pub zmp: Vector3<f64>,
    /// Planned vertical force (N).
    pub force_z: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_param_state_vector() {
        let initial = InitialParam {
            pos: Vector3::new(0.1, -0.2, 0.8),
            vel: Vector3::new(0.3, 0.0, -0.05),
            u_list: Vec::new(),
        };
        let x = initial.to_state_vector();
        assert_eq!(x, StateVector::from_column_slice(&[0.1, -0.2, 0.8, 0.3, 0.0, -0.05]));
    }

    #[test]
    fn steady_state_input_balances_gravity() {
        let u = InitialParam::steady_state_input(&Vector3::new(0.2, 0.1, 0.8), 50.0, 10.0);
        assert_eq!(u, InputVector::new(0.2, 0.1, 500.0));
    }
}
