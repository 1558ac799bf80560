//! Boundary to the MPC solver.
//!
//! The centroidal manager only relies on this contract; the optimization
//! algorithm behind it is exchangeable.

use stride_core::error::{DomainError, StrideError};

use crate::types::{InitialParam, PlannedData, RefData, SolveStats};

/// Reference callback: maps an absolute time to the reference at that time.
///
/// Fails with a [`DomainError`] when the time lies outside the registered
/// reference trajectories.
pub type RefFn<'a> = dyn Fn(f64) -> Result<RefData, DomainError> + 'a;

/// Finite-horizon ZMP planner invoked once per control tick.
pub trait ZmpPlanner {
    /// (Re)initialize for a robot of `mass` over `horizon_steps` steps of
    /// `horizon_dt` seconds, capped at `max_iter` iterations per call.
    ///
    /// Discards anything retained from earlier calls.
    fn configure(&mut self, mass: f64, horizon_dt: f64, horizon_steps: usize, max_iter: u32);

    /// Plan over the horizon starting at absolute time `t`.
    ///
    /// `initial.u_list` must hold exactly [`horizon_steps`](Self::horizon_steps)
    /// inputs. Errors from `ref_fn` are returned unchanged.
    fn plan_once(
        &mut self,
        ref_fn: &RefFn<'_>,
        initial: &InitialParam,
        t: f64,
    ) -> Result<PlannedData, StrideError>;

    /// Configured number of horizon steps.
    fn horizon_steps(&self) -> usize;

    /// Diagnostics of the most recent successful call.
    fn stats(&self) -> Option<&SolveStats>;
}
