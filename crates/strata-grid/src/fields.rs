//! Nodal fields: SoA buffers for all per-node data.
//!
//! The solver writes these every step; the characteristic diameter is
//! static and copied from the grid once at construction.

use strata_math::Vector;
use strata_types::{NodeId, StrataError, StrataResult};

use crate::space::GridSpace;

/// SoA nodal state of the background grid.
///
/// All arrays have length `node_count`.
#[derive(Debug, Clone)]
pub struct NodalFields {
    /// Number of nodes.
    pub node_count: usize,

    /// Nodal mass `m_i`.
    pub mass: Vec<f64>,
    /// Nodal velocity `u_i`.
    pub velocity: Vec<Vector>,
    /// Nodal acceleration `a_i`.
    pub acceleration: Vec<Vector>,
    /// Internal force `f_int_i` from the stress divergence.
    pub internal_force: Vec<Vector>,
    /// External force `f_ext_i`. Zero unless the caller sets it.
    pub external_force: Vec<Vector>,
    /// Volume estimate `v_i = 4/3 π (h_i / 2)³` used for initial density.
    pub volume: Vec<f64>,

    /// Characteristic cell diameter `h_i` (read-only after construction).
    cell_diameter: Vec<f64>,
}

impl NodalFields {
    /// Allocates zeroed fields for `node_count` nodes with the given diameters.
    pub fn new(cell_diameter: Vec<f64>) -> Self {
        let n = cell_diameter.len();
        Self {
            node_count: n,
            mass: vec![0.0; n],
            velocity: vec![Vector::ZERO; n],
            acceleration: vec![Vector::ZERO; n],
            internal_force: vec![Vector::ZERO; n],
            external_force: vec![Vector::ZERO; n],
            volume: vec![0.0; n],
            cell_diameter,
        }
    }

    /// Allocates fields for every node of a grid, copying its cell diameters.
    pub fn from_space(space: &dyn GridSpace) -> Self {
        let diameters = (0..space.node_count())
            .map(|i| space.cell_diameter(NodeId::from(i)))
            .collect();
        Self::new(diameters)
    }

    #[inline]
    pub fn mass(&self, node: NodeId) -> f64 {
        self.mass[node.index()]
    }

    #[inline]
    pub fn set_mass(&mut self, node: NodeId, mass: f64) {
        self.mass[node.index()] = mass;
    }

    #[inline]
    pub fn velocity(&self, node: NodeId) -> Vector {
        self.velocity[node.index()]
    }

    #[inline]
    pub fn set_velocity(&mut self, node: NodeId, velocity: Vector) {
        self.velocity[node.index()] = velocity;
    }

    #[inline]
    pub fn acceleration(&self, node: NodeId) -> Vector {
        self.acceleration[node.index()]
    }

    #[inline]
    pub fn set_acceleration(&mut self, node: NodeId, acceleration: Vector) {
        self.acceleration[node.index()] = acceleration;
    }

    #[inline]
    pub fn internal_force(&self, node: NodeId) -> Vector {
        self.internal_force[node.index()]
    }

    #[inline]
    pub fn set_internal_force(&mut self, node: NodeId, force: Vector) {
        self.internal_force[node.index()] = force;
    }

    #[inline]
    pub fn external_force(&self, node: NodeId) -> Vector {
        self.external_force[node.index()]
    }

    #[inline]
    pub fn set_external_force(&mut self, node: NodeId, force: Vector) {
        self.external_force[node.index()] = force;
    }

    /// Characteristic diameter of the cells around a node.
    #[inline]
    pub fn cell_diameter(&self, node: NodeId) -> f64 {
        self.cell_diameter[node.index()]
    }

    /// All characteristic diameters.
    pub fn cell_diameters(&self) -> &[f64] {
        &self.cell_diameter
    }

    /// Applies the same external force to every node.
    pub fn fill_external_force(&mut self, force: Vector) {
        self.external_force.fill(force);
    }

    /// Sum of nodal mass.
    pub fn total_mass(&self) -> f64 {
        self.mass.iter().sum()
    }

    /// Total nodal momentum `Σ m_i u_i`.
    pub fn total_momentum(&self) -> Vector {
        self.mass
            .iter()
            .zip(&self.velocity)
            .map(|(&m, &u)| u * m)
            .sum()
    }

    /// Copies every mutable field from `other`, which must have the same size.
    ///
    /// Used to roll the grid back to the start of a failed step.
    pub fn restore_from(&mut self, other: &NodalFields) -> StrataResult<()> {
        if other.node_count != self.node_count {
            return Err(StrataError::Configuration(format!(
                "Cannot restore nodal fields of {} nodes into {} nodes",
                other.node_count, self.node_count
            )));
        }
        self.mass.copy_from_slice(&other.mass);
        self.velocity.copy_from_slice(&other.velocity);
        self.acceleration.copy_from_slice(&other.acceleration);
        self.internal_force.copy_from_slice(&other.internal_force);
        self.external_force.copy_from_slice(&other.external_force);
        self.volume.copy_from_slice(&other.volume);
        Ok(())
    }
}
