//! Numerical constants and simulation defaults.

use crate::scalar::Scalar;

/// Lower bound applied to nodal mass whenever it is used as a divisor.
///
/// Numerical safeguard only; nodes lighter than this still report their
/// true accumulated mass.
pub const MASS_FLOOR: Scalar = 1.0e-2;

/// Default simulation timestep (seconds).
pub const DEFAULT_DT: Scalar = 1.0e-2;

/// Tolerance for partition-of-unity checks on basis stencils.
pub const PARTITION_TOLERANCE: Scalar = 1.0e-10;

/// Largest number of nodes influencing a single particle (trilinear hexahedron).
pub const MAX_STENCIL_NODES: usize = 8;

/// Tolerance used when snapping positions that sit on the far boundary of a grid.
pub const BOUNDARY_SNAP: Scalar = 1.0e-12;

/// Largest particle count a single sampled particle source may produce.
pub const MAX_SOURCE_PARTICLES: usize = 50_000_000;
