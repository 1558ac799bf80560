//! Centroidal manager: per-tick ZMP MPC over the reference trajectories.
//!
//! The manager owns the CoM and ZMP reference trajectories and a
//! [`ZmpPlanner`]. Each control tick it warm-starts the planner, samples the
//! ZMP reference across the horizon and publishes the first planned ZMP and
//! vertical force as a [`CentroidalCommand`].

use nalgebra::Vector3;
use stride_core::config::CentroidalConfig;
use stride_core::constants::GRAVITY;
use stride_core::error::{ConfigError, ControlError, DomainError, StrideError};
use stride_trajectory::{Function, PiecewiseFunction};
use tracing::{debug, info, warn};

use crate::ddp::DdpZmp;
use crate::planner::ZmpPlanner;
use crate::types::{CentroidalCommand, InitialParam, InputVector, RefData, SolveStats};

/// Lifecycle of the manager.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ManagerState {
    /// Constructed but not yet reset; `run_mpc` is rejected.
    #[default]
    Idle,
    /// Planner configured; ticks are accepted.
    Active,
}

/// Runs the centroidal MPC loop of a biped.
#[derive(Debug)]
pub struct CentroidalManager<P: ZmpPlanner = DdpZmp> {
    config: CentroidalConfig,
    mass: f64,
    planner: P,
    com_reference: PiecewiseFunction<Vector3<f64>>,
    zmp_reference: PiecewiseFunction<Vector3<f64>>,
    state: ManagerState,
    horizon_steps: usize,
    /// Planned input sequence of the last successful tick.
    warm_start: Vec<InputVector>,
    command: Option<CentroidalCommand>,
    last_stats: Option<SolveStats>,
}

impl CentroidalManager<DdpZmp> {
    /// Manager backed by the DDP planner, weighted by `config.weights`.
    pub fn new(mass: f64, config: CentroidalConfig) -> Self {
        let planner = DdpZmp::new(config.weights.clone());
        Self::with_planner(mass, config, planner)
    }
}

impl<P: ZmpPlanner> CentroidalManager<P> {
    /// Manager backed by an arbitrary planner. Starts [`ManagerState::Idle`].
    pub fn with_planner(mass: f64, config: CentroidalConfig, planner: P) -> Self {
        Self {
            config,
            mass,
            planner,
            com_reference: PiecewiseFunction::new(),
            zmp_reference: PiecewiseFunction::new(),
            state: ManagerState::Idle,
            horizon_steps: 0,
            warm_start: Vec::new(),
            command: None,
            last_stats: None,
        }
    }

    /// Validate the configuration, (re)configure the planner and enter
    /// [`ManagerState::Active`].
    ///
    /// On error nothing is modified. On success the warm start, command and
    /// statistics of any previous run are discarded.
    pub fn reset(&mut self) -> Result<(), ConfigError> {
        self.config.validate()?;
        if !(self.mass > 0.0) {
            return Err(ConfigError::InvalidMass(self.mass));
        }

        self.horizon_steps = self.config.horizon_steps();
        self.planner.configure(
            self.mass,
            self.config.horizon_dt,
            self.horizon_steps,
            self.config.ddp_max_iter,
        );
        self.warm_start.clear();
        self.command = None;
        self.last_stats = None;
        self.state = ManagerState::Active;

        info!(
            name = %self.config.name,
            mass = self.mass,
            horizon_duration = self.config.horizon_duration,
            horizon_dt = self.config.horizon_dt,
            horizon_steps = self.horizon_steps,
            ddp_max_iter = self.config.ddp_max_iter,
            "centroidal manager reset"
        );
        Ok(())
    }

    /// Run one MPC tick from the measured CoM state at time `t`.
    ///
    /// The ZMP reference must cover the whole horizon `[t, t + N dt]`;
    /// otherwise the [`DomainError`] is returned, no command is published
    /// for this tick and the warm start is kept.
    pub fn run_mpc(
        &mut self,
        com_pos: &Vector3<f64>,
        com_vel: &Vector3<f64>,
        t: f64,
    ) -> Result<&CentroidalCommand, StrideError> {
        if self.state != ManagerState::Active {
            return Err(ControlError::NotActive.into());
        }
        self.command = None;

        let u_list = if self.warm_start.len() == self.horizon_steps {
            self.warm_start.clone()
        } else {
            let steady = InitialParam::steady_state_input(com_pos, self.mass, GRAVITY);
            vec![steady; self.horizon_steps]
        };
        let initial = InitialParam {
            pos: *com_pos,
            vel: *com_vel,
            u_list,
        };

        let zmp_reference = &self.zmp_reference;
        let ref_com_z = self.config.ref_com_z;
        let ref_fn = |t: f64| ref_data(zmp_reference, ref_com_z, t);
        let planned = self.planner.plan_once(&ref_fn, &initial, t)?;

        let stats = planned.stats;
        debug!(
            t,
            iter = stats.iter,
            converged = stats.converged,
            solve_time_us = stats.solve_time_us,
            cost = stats.final_cost,
            "centroidal MPC tick"
        );
        if !stats.converged && stats.final_cost >= stats.initial_cost {
            warn!(
                t,
                iter = stats.iter,
                cost = stats.final_cost,
                "ZMP planner made no progress; keeping warm start plan"
            );
        }

        self.warm_start = planned.u_list;
        self.last_stats = Some(stats);
        let command = CentroidalCommand {
            zmp: Vector3::new(planned.zmp.x, planned.zmp.y, 0.0),
            force_z: planned.force_z,
        };
        Ok(&*self.command.insert(command))
    }

    /// Reference the planner tracks at `t`.
    pub fn calc_ref_data(&self, t: f64) -> Result<RefData, DomainError> {
        ref_data(&self.zmp_reference, self.config.ref_com_z, t)
    }

    /// CoM reference position at `t`.
    pub fn ref_com(&self, t: f64) -> Result<Vector3<f64>, DomainError> {
        self.com_reference.evaluate(t)
    }

    /// ZMP reference at `t`.
    pub fn ref_zmp(&self, t: f64) -> Result<Vector3<f64>, DomainError> {
        self.zmp_reference.evaluate(t)
    }

    pub fn com_reference(&self) -> &PiecewiseFunction<Vector3<f64>> {
        &self.com_reference
    }

    pub fn zmp_reference(&self) -> &PiecewiseFunction<Vector3<f64>> {
        &self.zmp_reference
    }

    /// Mutable CoM reference, for re-planning between ticks.
    pub fn com_reference_mut(&mut self) -> &mut PiecewiseFunction<Vector3<f64>> {
        &mut self.com_reference
    }

    /// Mutable ZMP reference, for re-planning between ticks.
    pub fn zmp_reference_mut(&mut self) -> &mut PiecewiseFunction<Vector3<f64>> {
        &mut self.zmp_reference
    }

    /// Command of the current tick; `None` before the first successful
    /// [`run_mpc`](Self::run_mpc) after a reset or after a failed tick.
    pub fn command(&self) -> Option<&CentroidalCommand> {
        self.command.as_ref()
    }

    /// Solver statistics of the last successful tick.
    pub fn stats(&self) -> Option<&SolveStats> {
        self.last_stats.as_ref()
    }

    /// Named monitoring values of the last successful tick: computation
    /// duration in milliseconds and iteration count.
    #[allow(clippy::cast_precision_loss)]
    pub fn diagnostics(&self) -> Vec<(String, f64)> {
        let Some(stats) = &self.last_stats else {
            return Vec::new();
        };
        let name = &self.config.name;
        vec![
            (
                format!("{name}_DDP_computationDuration"),
                stats.solve_time_us as f64 / 1000.0,
            ),
            (format!("{name}_DDP_iter"), f64::from(stats.iter)),
        ]
    }

    pub fn config(&self) -> &CentroidalConfig {
        &self.config
    }

    /// Robot mass in kilograms.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn state(&self) -> ManagerState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == ManagerState::Active
    }

    /// Number of horizon steps the planner was configured with; 0 while idle.
    pub fn horizon_steps(&self) -> usize {
        self.horizon_steps
    }

    /// Input sequence that seeds the next tick.
    pub fn warm_start(&self) -> &[InputVector] {
        &self.warm_start
    }

    pub fn planner(&self) -> &P {
        &self.planner
    }
}

fn ref_data(
    zmp_reference: &PiecewiseFunction<Vector3<f64>>,
    ref_com_z: f64,
    t: f64,
) -> Result<RefData, DomainError> {
    let zmp = zmp_reference.evaluate(t)?;
    Ok(RefData {
        zmp: zmp.xy(),
        com_z: ref_com_z,
    })
}
