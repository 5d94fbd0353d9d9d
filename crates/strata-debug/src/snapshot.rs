//! Grid snapshot serialization for output and debugging.
//!
//! A snapshot captures the nodal fields after the constitutive update
//! of a step, flattened to the active dimension.

use serde::{Deserialize, Serialize};
use strata_grid::NodalFields;
use strata_math::tensor::flatten;
use strata_types::{Dimension, StrataError, StrataResult};

/// Nodal state at the end of one step's grid solve.
///
/// Vector fields are flat (`[x0, y0, x1, y1, ...]` in 2D,
/// `[x0, y0, z0, ...]` in 3D).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Step index when this snapshot was taken.
    pub step: u64,
    /// Simulation time at the start of the step.
    pub sim_time: f64,
    pub dimension: Dimension,
    /// Nodal mass, one entry per node.
    pub mass: Vec<f64>,
    pub velocity: Vec<f64>,
    pub acceleration: Vec<f64>,
    pub internal_force: Vec<f64>,
}

impl GridSnapshot {
    /// Copies the current nodal fields.
    pub fn capture(step: u64, sim_time: f64, dimension: Dimension, nodes: &NodalFields) -> Self {
        Self {
            step,
            sim_time,
            dimension,
            mass: nodes.mass.clone(),
            velocity: flatten(&nodes.velocity, dimension),
            acceleration: flatten(&nodes.acceleration, dimension),
            internal_force: flatten(&nodes.internal_force, dimension),
        }
    }

    /// Number of nodes in the snapshot.
    pub fn node_count(&self) -> usize {
        self.mass.len()
    }

    /// Total nodal mass.
    pub fn total_mass(&self) -> f64 {
        self.mass.iter().sum()
    }

    /// Velocity of one node as a slice of `dimension` components.
    pub fn node_velocity(&self, node: usize) -> Option<&[f64]> {
        let d = self.dimension.count();
        self.velocity.get(node * d..(node + 1) * d)
    }

    /// Largest nodal speed.
    pub fn max_speed(&self) -> f64 {
        let d = self.dimension.count();
        self.velocity
            .chunks_exact(d)
            .map(|c| c.iter().map(|v| v * v).sum::<f64>().sqrt())
            .fold(0.0, f64::max)
    }

    /// Serializes to compact binary format.
    pub fn to_bytes(&self) -> StrataResult<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| StrataError::Serialization(format!("Snapshot serialization failed: {e}")))
    }

    /// Deserializes from binary format.
    pub fn from_bytes(data: &[u8]) -> StrataResult<Self> {
        bincode::deserialize(data)
            .map_err(|e| StrataError::Serialization(format!("Snapshot deserialization failed: {e}")))
    }
}
