//! Simulation event types.
//!
//! Structured events emitted by the integrator at various points in
//! each timestep. Events are lightweight value types that carry just
//! enough data to monitor a run and diagnose a halt.

use serde::{Deserialize, Serialize};
use strata_types::Stage;

/// A simulation event emitted by the engine.
///
/// Events are tagged with a step index and carry domain-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Step number (0-indexed).
    pub step: u64,
    /// Event payload.
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Step started.
    StepBegin {
        /// Simulation time at the start of the step.
        sim_time: f64,
    },

    /// Step completed.
    StepEnd {
        /// Wall-clock time for the entire step (seconds).
        wall_time: f64,
    },

    /// Density and reference volumes were computed on the first step.
    Initialized {
        /// Total particle count over all materials.
        particles: usize,
        /// Total reference volume `Σ V0`.
        volume: f64,
    },

    /// A pipeline stage finished.
    StageCompleted { stage: Stage },

    /// Particle mass versus grid mass after the mass transfer.
    Conservation {
        particle_mass: f64,
        grid_mass: f64,
    },

    /// Nodes whose mass fell below the floor and were clamped as divisors.
    MassFloor {
        /// Stage in which the floor was applied.
        stage: Stage,
        /// Number of floored nodes that carry some mass.
        nodes: usize,
    },

    /// Energy snapshot at the end of a step.
    Energy {
        /// Particle kinetic energy `½ Σ m u·u`.
        kinetic: f64,
    },

    /// The integrator halted on an error and rolled back the step.
    Halted {
        /// Display form of the error.
        reason: String,
    },

    /// Custom event for extensibility.
    Custom {
        /// Arbitrary label.
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given step.
    pub fn new(step: u64, kind: EventKind) -> Self {
        Self { step, kind }
    }
}
