//! Named stages of an MPM timestep.
//!
//! Used for stage-order bookkeeping, error context, and telemetry.

use serde::{Deserialize, Serialize};

/// A single stage of the explicit MPM step, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    FormulateBasis,
    MassToGrid,
    VelocityToGrid,
    InitializeTensors,
    GridVolume,
    Density,
    InitialVolume,
    InternalForces,
    GridAcceleration,
    GridVelocity,
    VelocityGradient,
    DeformationGradient,
    Volume,
    Stress,
    AccelerationToMaterial,
    VelocityToMaterial,
    Advection,
}

impl Stage {
    /// Every stage in execution order.
    pub const ALL: [Stage; 17] = [
        Stage::FormulateBasis,
        Stage::MassToGrid,
        Stage::VelocityToGrid,
        Stage::InitializeTensors,
        Stage::GridVolume,
        Stage::Density,
        Stage::InitialVolume,
        Stage::InternalForces,
        Stage::GridAcceleration,
        Stage::GridVelocity,
        Stage::VelocityGradient,
        Stage::DeformationGradient,
        Stage::Volume,
        Stage::Stress,
        Stage::AccelerationToMaterial,
        Stage::VelocityToMaterial,
        Stage::Advection,
    ];

    /// Bit used for this stage in a completed-stage mask.
    #[inline]
    pub fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Returns a snake_case name for logs and events.
    pub fn name(self) -> &'static str {
        match self {
            Stage::FormulateBasis => "formulate_basis",
            Stage::MassToGrid => "mass_to_grid",
            Stage::VelocityToGrid => "velocity_to_grid",
            Stage::InitializeTensors => "initialize_tensors",
            Stage::GridVolume => "grid_volume",
            Stage::Density => "density",
            Stage::InitialVolume => "initial_volume",
            Stage::InternalForces => "internal_forces",
            Stage::GridAcceleration => "grid_acceleration",
            Stage::GridVelocity => "grid_velocity",
            Stage::VelocityGradient => "velocity_gradient",
            Stage::DeformationGradient => "deformation_gradient",
            Stage::Volume => "volume",
            Stage::Stress => "stress",
            Stage::AccelerationToMaterial => "acceleration_to_material",
            Stage::VelocityToMaterial => "velocity_to_material",
            Stage::Advection => "advection",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
