//! # strata-io
//!
//! Simulation input/output contract, input validation, and snapshot output.
//!
//! Defines the boundary types that external systems (CLI, scripted runs)
//! use to describe a simulation, and turns them into a ready
//! [`SimulationContext`](strata_solver::SimulationContext).

pub mod contract;
pub mod scene;
pub mod validator;
pub mod writer;

pub use contract::{GridSpec, MaterialInput, ParticleSource, SimulationInput, SimulationReport};
pub use scene::{build_context, build_grid, build_materials};
pub use validator::validate_input;
pub use writer::{read_snapshot, snapshot_file_name, SnapshotWriter};
