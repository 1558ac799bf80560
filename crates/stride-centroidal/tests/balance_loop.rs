//! Integration test: closed-loop centroidal MPC on the ZMP point-mass model.
//!
//! The manager plans against a ZMP reference that shifts sideways (as at the
//! start of a step) and the CoM is simulated with the planner's own model at
//! the control period. Checks that:
//! 1. Every tick produces a finite command on the ground plane
//! 2. The CoM height stays at the configured reference
//! 3. The CoM follows the ZMP reference sideways without diverging
//! 4. The whole loop is deterministic

use nalgebra::Vector3;
use stride_centroidal::{CentroidalCommand, CentroidalManager, DdpZmp, StateVector, ZmpPlanner};
use stride_core::config::CentroidalConfig;
use stride_core::error::{DomainError, StrideError};
use stride_test_utils::shifting_zmp_reference;

const MASS: f64 = 45.0;
const CONTROL_DT: f64 = 0.02;
const TICKS: usize = 200;
const ZMP_SHIFT: f64 = 0.05;

fn config() -> CentroidalConfig {
    CentroidalConfig {
        horizon_duration: 1.0,
        horizon_dt: CONTROL_DT,
        ..CentroidalConfig::default()
    }
}

fn manager() -> CentroidalManager {
    let mut manager = CentroidalManager::new(MASS, config());
    *manager.zmp_reference_mut() = shifting_zmp_reference(
        Vector3::zeros(),
        Vector3::new(0.0, ZMP_SHIFT, 0.0),
        0.0,
        1.0,
        0.5,
        10.0,
    );
    manager.reset().unwrap();
    manager
}

/// Simulate `TICKS` control periods; returns the commands and final state.
#[allow(clippy::cast_precision_loss)]
fn simulate() -> (Vec<CentroidalCommand>, StateVector) {
    let config = config();
    let mut manager = manager();
    let mut plant = DdpZmp::new(config.weights.clone());
    plant.configure(MASS, CONTROL_DT, 1, 1);

    let mut x = StateVector::zeros();
    x[2] = config.ref_com_z;
    let mut commands = Vec::with_capacity(TICKS);

    for tick in 0..TICKS {
        let t = tick as f64 * CONTROL_DT;
        let pos = Vector3::new(x[0], x[1], x[2]);
        let vel = Vector3::new(x[3], x[4], x[5]);
        let command = *manager.run_mpc(&pos, &vel, t).unwrap();

        let u = Vector3::new(command.zmp.x, command.zmp.y, command.force_z);
        x = plant.dynamics(&x, &u);
        commands.push(command);
    }
    (commands, x)
}

#[test]
fn commands_are_finite_and_on_ground() {
    let (commands, _) = simulate();
    assert_eq!(commands.len(), TICKS);
    for command in &commands {
        assert!(command.zmp.iter().all(|v| v.is_finite()));
        assert!(command.force_z.is_finite());
        assert_eq!(command.zmp.z, 0.0);
        assert!(command.force_z > 0.0, "ground can only push: {command:?}");
    }
}

#[test]
fn standing_phase_stays_still() {
    let (commands, _) = simulate();
    // Only the first horizon [0, 1] lies entirely before the shift.
    assert!(commands[0].zmp.norm() < 1e-9, "{:?}", commands[0]);
    assert!((commands[0].force_z - MASS * stride_core::constants::GRAVITY).abs() < 1e-6);
}

#[test]
fn com_height_is_held() {
    let (_, x) = simulate();
    assert!((x[2] - config().ref_com_z).abs() < 0.02, "final CoM height {}", x[2]);
    assert!(x[5].abs() < 0.05, "final vertical velocity {}", x[5]);
}

#[test]
fn com_follows_zmp_shift_without_diverging() {
    let (_, x) = simulate();
    assert!(x[1] > 0.0, "CoM should move toward the shifted ZMP: {}", x[1]);
    assert!(x[1] < 4.0 * ZMP_SHIFT, "CoM overshoots: {}", x[1]);
    assert!(x[0].abs() < 1e-6, "no sagittal reference change: {}", x[0]);
    assert!(x[4].abs() < 0.5, "lateral velocity {}", x[4]);
}

#[test]
fn closed_loop_is_deterministic() {
    let (a, xa) = simulate();
    let (b, xb) = simulate();
    assert_eq!(a, b);
    assert_eq!(xa, xb);
}

#[test]
fn horizon_past_reference_end_fails() {
    let mut manager = manager();
    let pos = Vector3::new(0.0, 0.0, 0.825);
    // 9.5 + 1.0 exceeds the 10 s reference.
    let err = manager.run_mpc(&pos, &Vector3::zeros(), 9.5).unwrap_err();
    assert!(matches!(err, StrideError::Domain(DomainError::OutOfRange { .. })));
    assert!(manager.command().is_none());
}
