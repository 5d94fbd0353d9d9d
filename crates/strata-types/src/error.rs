//! Error types for the Strata engine.
//!
//! All crates return `StrataResult<T>` from fallible operations.
//! Mass underflow on grid nodes is deliberately absent: it is
//! recovered by flooring and reported through telemetry instead.

use thiserror::Error;

use crate::ids::{Entity, MaterialId, ParticleId};
use crate::stage::Stage;

/// Unified error type for the Strata engine.
#[derive(Debug, Error)]
pub enum StrataError {
    /// Grid/material dimensionality, array lengths, or parameters are inconsistent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Material parameter is out of valid range.
    #[error("Invalid material parameter: {0}")]
    InvalidMaterial(String),

    /// A particle has no containing grid cell.
    #[error(
        "Out-of-domain particle: {particle} of {material} at [{:.6}, {:.6}, {:.6}] (step {step})",
        .position[0], .position[1], .position[2]
    )]
    OutOfDomainParticle {
        material: MaterialId,
        particle: ParticleId,
        position: [f64; 3],
        step: u64,
    },

    /// det(F) or det(dF) is zero, negative, or non-finite.
    #[error("Singular deformation: {particle} of {material} has determinant {determinant:.3e} (step {step})")]
    SingularDeformation {
        material: MaterialId,
        particle: ParticleId,
        step: u64,
        determinant: f64,
    },

    /// A field contains NaN or Inf after an update stage.
    #[error("Numerical divergence in `{field}` of {entity} after stage {stage} (step {step})")]
    NumericalDivergence {
        stage: Stage,
        step: u64,
        entity: Entity,
        field: &'static str,
    },

    /// A stage ran before one of its prerequisites in the current step.
    #[error("Stage {stage} requires {requires} to run first in the same step")]
    StageOrder { stage: Stage, requires: Stage },

    /// The integrator has already halted.
    #[error("Simulation has terminated; no further steps can run")]
    Terminated,

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StrataError {
    /// Returns true for errors raised by the numerical pipeline itself
    /// (as opposed to setup, ordering, or I/O problems).
    pub fn is_numerical(&self) -> bool {
        matches!(
            self,
            StrataError::OutOfDomainParticle { .. }
                | StrataError::SingularDeformation { .. }
                | StrataError::NumericalDivergence { .. }
        )
    }
}

/// Convenience alias for `Result<T, StrataError>`.
pub type StrataResult<T> = Result<T, StrataError>;
