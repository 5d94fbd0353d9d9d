//! # strata-math
//!
//! Linear algebra primitives for the Strata simulation engine.
//!
//! Provides:
//! - Re-exports of `glam` double-precision types under domain names
//!   (`Vector` for positions/velocities, `Tensor` for gradients and stresses)
//! - Tensor helpers the MPM stages need: outer product, Hadamard product,
//!   trace, symmetric part, and planar restriction

pub mod tensor;

// Re-export glam f64 types as the canonical math types for Strata.
pub use glam::{DMat3, DVec3};

/// Position, velocity, acceleration, and force vectors.
pub type Vector = DVec3;

/// Second-order tensors: deformation gradients, velocity gradients, strain, stress.
pub type Tensor = DMat3;

pub use tensor::{hadamard, outer, restrict, restrict_tensor, symmetric_part, trace};
