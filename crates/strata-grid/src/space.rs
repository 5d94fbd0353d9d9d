//! Grid capability trait: the contract between the solver and the mesh.
//!
//! The solver never constructs basis functions itself. It asks a
//! [`GridSpace`] which nodes influence a point and what the basis value
//! and gradient of each of those nodes is there.

use strata_math::Vector;
use strata_types::constants::MAX_STENCIL_NODES;
use strata_types::{Dimension, NodeId};

/// Basis functions of one particle: influencing nodes with `φ` and `∇φ`.
///
/// Fixed capacity so that every particle's cache is preallocated and
/// formulating the basis never reallocates.
#[derive(Debug, Clone, Copy)]
pub struct BasisStencil {
    len: usize,
    nodes: [NodeId; MAX_STENCIL_NODES],
    values: [f64; MAX_STENCIL_NODES],
    gradients: [Vector; MAX_STENCIL_NODES],
}

impl BasisStencil {
    /// Creates an empty stencil.
    pub const fn new() -> Self {
        Self {
            len: 0,
            nodes: [NodeId(0); MAX_STENCIL_NODES],
            values: [0.0; MAX_STENCIL_NODES],
            gradients: [Vector::ZERO; MAX_STENCIL_NODES],
        }
    }

    /// Removes all entries.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Appends an entry. Returns `false` if the stencil is full.
    #[inline]
    pub fn push(&mut self, node: NodeId, value: f64, gradient: Vector) -> bool {
        if self.len == MAX_STENCIL_NODES {
            return false;
        }
        self.nodes[self.len] = node;
        self.values[self.len] = value;
        self.gradients[self.len] = gradient;
        self.len += 1;
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Influencing node ids.
    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes[..self.len]
    }

    /// Basis values `φ_i(x_p)`.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values[..self.len]
    }

    /// Basis gradients `∇φ_i(x_p)`.
    #[inline]
    pub fn gradients(&self) -> &[Vector] {
        &self.gradients[..self.len]
    }

    /// Iterates `(node, φ, ∇φ)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, f64, Vector)> + '_ {
        (0..self.len).map(move |k| (self.nodes[k], self.values[k], self.gradients[k]))
    }

    /// `Σ φ`, which is 1 for a partition of unity.
    pub fn value_sum(&self) -> f64 {
        self.values().iter().sum()
    }

    /// `Σ ∇φ`, which is the zero vector for a partition of unity.
    pub fn gradient_sum(&self) -> Vector {
        self.gradients().iter().copied().sum()
    }
}

impl Default for BasisStencil {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability contract for a background grid.
///
/// Implementations own the spatial discretization; they are built once by
/// the caller and borrowed by the simulation for its whole lifetime.
pub trait GridSpace: Send + Sync {
    /// Spatial dimensionality of the grid.
    fn dimension(&self) -> Dimension;

    /// Number of grid nodes (degrees of freedom per field component).
    fn node_count(&self) -> usize;

    /// Number of nodes that influence a point inside a cell.
    fn nodes_per_cell(&self) -> usize;

    /// Nodes whose basis functions are non-zero at `x`, or `None`
    /// if `x` lies in no cell.
    fn nodes_influencing(&self, x: Vector) -> Option<Vec<NodeId>>;

    /// Basis value of `node` at `x`.
    fn basis_value(&self, node: NodeId, x: Vector) -> f64;

    /// Basis gradient of `node` at `x`.
    fn basis_gradient(&self, node: NodeId, x: Vector) -> Vector;

    /// Position of a node.
    fn node_position(&self, node: NodeId) -> Vector;

    /// Characteristic cell diameter `h_i` associated with a node.
    fn cell_diameter(&self, node: NodeId) -> f64;

    /// Fills `stencil` with the basis functions at `x`.
    ///
    /// Returns `false` if `x` maps to no cell. Implementations are
    /// encouraged to override this with a single cell lookup.
    fn evaluate_basis(&self, x: Vector, stencil: &mut BasisStencil) -> bool {
        stencil.clear();
        let Some(nodes) = self.nodes_influencing(x) else {
            return false;
        };
        for node in nodes {
            if !stencil.push(node, self.basis_value(node, x), self.basis_gradient(node, x)) {
                return false;
            }
        }
        true
    }
}
