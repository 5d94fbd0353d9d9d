//! # strata-solver
//!
//! Material point method core: particle state, particle ↔ grid
//! transfers, constitutive updates, the explicit grid solve, and the
//! time integrator that sequences them.
//!
//! ## Key Types
//!
//! - [`ParticleState`]: SoA buffers for positions, velocities, tensors, basis
//! - [`Material`]: One constitutive model plus its particles
//! - [`SimulationContext`]: Grid, nodal fields, materials, and stage bookkeeping
//! - [`SolverConfig`]: Time window, mass floor, composition rule, flags
//! - [`Integrator`]: Phase machine that runs the step pipeline
//!
//! ## Stage modules
//!
//! - [`transfer`]: basis, P2G, G2P, velocity gradient, advection
//! - [`constitutive`]: grid volume, density, volumes, deformation, stress
//! - [`grid_solver`]: internal force, acceleration, velocity update

mod checks;
mod parallel;

pub mod config;
pub mod constitutive;
pub mod context;
pub mod diagnostics;
pub mod grid_solver;
pub mod integrator;
pub mod material;
pub mod state;
pub mod transfer;

pub use config::{DeformationUpdate, SolverConfig};
pub use context::{Checkpoint, SimulationContext};
pub use diagnostics::{Conservation, FieldRange};
pub use integrator::{Integrator, Phase, RunSummary, StepResult, StopHandle};
pub use material::Material;
pub use state::ParticleState;
