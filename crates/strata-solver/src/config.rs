//! Solver configuration.
//!
//! Parameters that control the time window, the mass floor, how the
//! deformation gradient is composed, and failure handling.

use serde::{Deserialize, Serialize};
use strata_types::constants::{DEFAULT_DT, MASS_FLOOR};
use strata_types::{Dimension, StrataError, StrataResult};

/// How the incremental deformation gradient is composed into `F`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeformationUpdate {
    /// `F ← dF · F`. Keeps `V = det(F) V0` exact.
    #[default]
    Multiplicative,
    /// `F ← dF ∘ F` (element-wise). Loses shear coupling; kept for
    /// reproducing element-wise reference results.
    Hadamard,
}

/// Configuration for the simulation solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Spatial dimension; must match the grid.
    pub dimension: Dimension,

    /// Timestep Δt in seconds.
    pub dt: f64,

    /// Simulation start time.
    pub t_start: f64,

    /// The run ends once simulation time exceeds this value.
    pub t_end: f64,

    /// Lower bound ε applied to nodal mass when it is used as a divisor.
    pub mass_floor: f64,

    /// Composition rule for the deformation gradient.
    pub deformation_update: DeformationUpdate,

    /// Restore the start-of-step state when a step fails.
    pub rollback_on_error: bool,

    /// Run particle stages and scatters on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            dimension: Dimension::Two,
            dt: DEFAULT_DT,
            t_start: 0.0,
            t_end: 1.0,
            mass_floor: MASS_FLOOR,
            deformation_update: DeformationUpdate::Multiplicative,
            rollback_on_error: true,
            parallel: false,
        }
    }
}

impl SolverConfig {
    /// Creates a config for debugging: short window, sequential stages.
    pub fn debug() -> Self {
        Self {
            t_end: 0.1,
            parallel: false,
            ..Default::default()
        }
    }

    /// Creates a config that runs particle work on the thread pool.
    pub fn parallel() -> Self {
        Self {
            parallel: true,
            ..Default::default()
        }
    }

    /// Checks time window, timestep, and floor.
    pub fn validate(&self) -> StrataResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(StrataError::Configuration(format!(
                "dt must be positive and finite, got {}",
                self.dt
            )));
        }
        if !(self.t_start.is_finite() && self.t_end.is_finite()) {
            return Err(StrataError::Configuration(
                "t_start and t_end must be finite".into(),
            ));
        }
        if self.t_end < self.t_start {
            return Err(StrataError::Configuration(format!(
                "t_end ({}) is before t_start ({})",
                self.t_end, self.t_start
            )));
        }
        if !(self.mass_floor.is_finite() && self.mass_floor > 0.0) {
            return Err(StrataError::Configuration(format!(
                "mass_floor must be positive, got {}",
                self.mass_floor
            )));
        }
        Ok(())
    }

    /// Simulation time after `steps` completed steps.
    #[inline]
    pub fn time_after(&self, steps: u64) -> f64 {
        self.t_start + steps as f64 * self.dt
    }

    /// Number of steps a full run takes: the first `n` with `time_after(n) > t_end`.
    pub fn step_count(&self) -> u64 {
        let mut n = ((self.t_end - self.t_start) / self.dt).floor().max(0.0) as u64;
        while self.time_after(n) <= self.t_end {
            n += 1;
        }
        n
    }
}
