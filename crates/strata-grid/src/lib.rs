//! # strata-grid
//!
//! The fixed background discretization of an MPM simulation.
//!
//! ## Key Types
//!
//! - [`GridSpace`]: Capability trait the solver queries: influencing
//!   nodes, basis values and gradients, per-node characteristic diameter.
//! - [`BasisStencil`]: Fixed-capacity per-particle cache of `(node, φ, ∇φ)`.
//! - [`RectilinearGrid`]: Structured bilinear (2D) / trilinear (3D) grid.
//! - [`NodalFields`]: SoA nodal mass, velocity, acceleration, and forces.
//! - Particle samplers and grid constructors for scenarios and tests.

pub mod fields;
pub mod generators;
pub mod rectilinear;
pub mod space;

pub use fields::NodalFields;
pub use rectilinear::RectilinearGrid;
pub use space::{BasisStencil, GridSpace};
