//! Scalar type alias for the simulation.
//!
//! The MPM kernel is CPU-only and accumulates many small contributions
//! into shared grid nodes, so it runs in double precision throughout.

/// The floating-point type used throughout the simulation.
pub type Scalar = f64;
