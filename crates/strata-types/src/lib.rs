//! # strata-types
//!
//! Shared types, identifiers, error types, and numerical constants
//! for the Strata material point method engine.
//!
//! This crate has zero domain logic: it defines the vocabulary
//! that all other Strata crates share.

pub mod constants;
pub mod dimension;
pub mod error;
pub mod ids;
pub mod scalar;
pub mod stage;

pub use dimension::Dimension;
pub use error::{StrataError, StrataResult};
pub use ids::{Entity, MaterialId, NodeId, ParticleId};
pub use scalar::Scalar;
pub use stage::Stage;
