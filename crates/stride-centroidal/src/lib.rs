//! Centroidal ZMP model-predictive balance control for biped walking.
//!
//! Each control tick the [`CentroidalManager`] corrects the reference ZMP so
//! the centre of mass stays balanced:
//!
//! 1. **Warm start**: previous planned input sequence, or the steady state
//!    (ZMP under the CoM, `f_z = m g`) after a reset
//! 2. **ZMP planner**: optimizes ZMP and vertical force over the horizon
//!    against the ZMP reference trajectory
//! 3. **Command**: first planned ZMP and vertical force, handed to the
//!    whole-body task layer
//!
//! # Architecture
//!
//! The robot is reduced to a point mass at the CoM, pushed by a ground
//! reaction force applied at the ZMP. The planner sits behind the
//! [`ZmpPlanner`] trait; [`DdpZmp`] solves the horizon with iLQR.

pub mod ddp;
pub mod manager;
pub mod planner;
pub mod types;

pub use ddp::DdpZmp;
pub use manager::{CentroidalManager, ManagerState};
pub use planner::{RefFn, ZmpPlanner};
pub use types::{
    CentroidalCommand, InitialParam, InputVector, PlannedData, RefData, SolveStats, StateVector,
};
