//! Structured rectilinear grid with Q1 (bilinear / trilinear) basis functions.
//!
//! Nodes are numbered x-fastest: `node = i + nx * (j + ny * k)` where
//! `nx`, `ny` are node counts per axis. Each cell has `2^d` corner nodes,
//! and the basis function of a corner is the tensor product of 1D hat
//! functions, so `Σ φ = 1` and `Σ ∇φ = 0` hold exactly inside every cell.

use serde::{Deserialize, Serialize};
use strata_math::Vector;
use strata_types::constants::BOUNDARY_SNAP;
use strata_types::{Dimension, NodeId, StrataError, StrataResult};

use crate::space::{BasisStencil, GridSpace};

/// A uniform axis-aligned grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectilinearGrid {
    dimension: Dimension,
    /// Lower corner of the domain.
    origin: Vector,
    /// Cell edge length per axis (unused axes ignored).
    spacing: Vector,
    /// Cell count per axis; the third entry is ignored in 2D.
    cells: [usize; 3],
}

/// Cell containing a point plus the point's local coordinates in `[0, 1]^d`.
#[derive(Debug, Clone, Copy)]
struct CellLocation {
    cell: [usize; 3],
    local: [f64; 3],
}

impl RectilinearGrid {
    /// Creates a grid, validating spacing and cell counts on every active axis.
    pub fn new(
        dimension: Dimension,
        origin: Vector,
        spacing: Vector,
        cells: [usize; 3],
    ) -> StrataResult<Self> {
        let d = dimension.count();
        for axis in 0..d {
            let h = spacing[axis];
            if !(h.is_finite() && h > 0.0) {
                return Err(StrataError::Configuration(format!(
                    "Grid spacing along axis {axis} must be positive and finite, got {h}"
                )));
            }
            if cells[axis] == 0 {
                return Err(StrataError::Configuration(format!(
                    "Grid needs at least one cell along axis {axis}"
                )));
            }
            if !origin[axis].is_finite() {
                return Err(StrataError::Configuration(format!(
                    "Grid origin along axis {axis} is not finite"
                )));
            }
        }

        let mut cells = cells;
        let mut spacing = spacing;
        let mut origin = origin;
        if dimension == Dimension::Two {
            cells[2] = 0;
            spacing.z = 1.0;
            origin.z = 0.0;
        }

        Ok(Self {
            dimension,
            origin,
            spacing,
            cells,
        })
    }

    /// Creates a grid covering `[min, max]` with `cells` cells per axis.
    pub fn from_bounds(
        dimension: Dimension,
        min: Vector,
        max: Vector,
        cells: [usize; 3],
    ) -> StrataResult<Self> {
        let mut spacing = Vector::ONE;
        for axis in 0..dimension.count() {
            if cells[axis] == 0 {
                return Err(StrataError::Configuration(format!(
                    "Grid needs at least one cell along axis {axis}"
                )));
            }
            spacing[axis] = (max[axis] - min[axis]) / cells[axis] as f64;
        }
        Self::new(dimension, min, spacing, cells)
    }

    /// Lower corner of the domain.
    pub fn origin(&self) -> Vector {
        self.origin
    }

    /// Cell edge lengths.
    pub fn spacing(&self) -> Vector {
        self.spacing
    }

    /// Cell counts per axis (third entry is 0 in 2D).
    pub fn cells(&self) -> [usize; 3] {
        self.cells
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        (0..self.dimension.count()).map(|a| self.cells[a]).product()
    }

    /// Node counts per axis (third entry is 1 in 2D).
    pub fn node_counts(&self) -> [usize; 3] {
        match self.dimension {
            Dimension::Two => [self.cells[0] + 1, self.cells[1] + 1, 1],
            Dimension::Three => [self.cells[0] + 1, self.cells[1] + 1, self.cells[2] + 1],
        }
    }

    /// Upper corner of the domain.
    pub fn max_corner(&self) -> Vector {
        let mut max = self.origin;
        for axis in 0..self.dimension.count() {
            max[axis] += self.spacing[axis] * self.cells[axis] as f64;
        }
        max
    }

    /// Flat node index from per-axis node coordinates.
    #[inline]
    pub fn node_index(&self, i: usize, j: usize, k: usize) -> NodeId {
        let [nx, ny, _] = self.node_counts();
        NodeId::from(i + nx * (j + ny * k))
    }

    /// Per-axis node coordinates from a flat node index.
    #[inline]
    pub fn node_coords(&self, node: NodeId) -> [usize; 3] {
        let [nx, ny, _] = self.node_counts();
        let n = node.index();
        [n % nx, (n / nx) % ny, n / (nx * ny)]
    }

    /// Finds the cell containing `x`.
    ///
    /// Points on the far boundary (within [`BOUNDARY_SNAP`] in local
    /// coordinates) belong to the last cell along that axis.
    fn locate(&self, x: Vector) -> Option<CellLocation> {
        let mut location = CellLocation {
            cell: [0; 3],
            local: [0.0; 3],
        };
        for axis in 0..self.dimension.count() {
            let s = (x[axis] - self.origin[axis]) / self.spacing[axis];
            let n = self.cells[axis] as f64;
            if !s.is_finite() || s < -BOUNDARY_SNAP || s > n + BOUNDARY_SNAP {
                return None;
            }
            let cell = (s.floor().max(0.0) as usize).min(self.cells[axis] - 1);
            location.cell[axis] = cell;
            location.local[axis] = (s - cell as f64).clamp(0.0, 1.0);
        }
        Some(location)
    }

    /// Visits every corner of a located cell with its node, `φ`, and `∇φ`.
    fn for_each_corner(&self, loc: &CellLocation, mut visit: impl FnMut(NodeId, f64, Vector)) {
        let d = self.dimension.count();
        let corners = 1usize << d;
        for corner in 0..corners {
            let mut offset = [0usize; 3];
            // 1D hat values and their derivatives along each axis
            let mut hat = [1.0f64; 3];
            let mut slope = [0.0f64; 3];
            for axis in 0..d {
                let upper = (corner >> axis) & 1 == 1;
                offset[axis] = upper as usize;
                let xi = loc.local[axis];
                let inv_h = 1.0 / self.spacing[axis];
                if upper {
                    hat[axis] = xi;
                    slope[axis] = inv_h;
                } else {
                    hat[axis] = 1.0 - xi;
                    slope[axis] = -inv_h;
                }
            }

            let value = hat[0] * hat[1] * hat[2];
            let mut gradient = Vector::ZERO;
            for axis in 0..d {
                let mut g = slope[axis];
                for other in 0..d {
                    if other != axis {
                        g *= hat[other];
                    }
                }
                gradient[axis] = g;
            }

            let node = self.node_index(
                loc.cell[0] + offset[0],
                loc.cell[1] + offset[1],
                loc.cell[2] + offset[2],
            );
            visit(node, value, gradient);
        }
    }

    /// Looks up one node's `(φ, ∇φ)` at `x` through the containing cell.
    fn corner_basis(&self, node: NodeId, x: Vector) -> (f64, Vector) {
        let Some(loc) = self.locate(x) else {
            return (0.0, Vector::ZERO);
        };
        let mut result = (0.0, Vector::ZERO);
        self.for_each_corner(&loc, |n, value, gradient| {
            if n == node {
                result = (value, gradient);
            }
        });
        result
    }
}

impl GridSpace for RectilinearGrid {
    fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn node_count(&self) -> usize {
        self.node_counts().iter().product()
    }

    fn nodes_per_cell(&self) -> usize {
        1 << self.dimension.count()
    }

    fn nodes_influencing(&self, x: Vector) -> Option<Vec<NodeId>> {
        let loc = self.locate(x)?;
        let mut nodes = Vec::with_capacity(self.nodes_per_cell());
        self.for_each_corner(&loc, |node, _, _| nodes.push(node));
        Some(nodes)
    }

    fn basis_value(&self, node: NodeId, x: Vector) -> f64 {
        self.corner_basis(node, x).0
    }

    fn basis_gradient(&self, node: NodeId, x: Vector) -> Vector {
        self.corner_basis(node, x).1
    }

    fn node_position(&self, node: NodeId) -> Vector {
        let [i, j, k] = self.node_coords(node);
        let mut p = self.origin;
        p.x += i as f64 * self.spacing.x;
        p.y += j as f64 * self.spacing.y;
        if self.dimension == Dimension::Three {
            p.z += k as f64 * self.spacing.z;
        }
        p
    }

    fn cell_diameter(&self, _node: NodeId) -> f64 {
        // Uniform grid: every adjacent cell has the same diagonal.
        let d = self.dimension.count();
        (0..d)
            .map(|a| self.spacing[a] * self.spacing[a])
            .sum::<f64>()
            .sqrt()
    }

    fn evaluate_basis(&self, x: Vector, stencil: &mut BasisStencil) -> bool {
        stencil.clear();
        let Some(loc) = self.locate(x) else {
            return false;
        };
        self.for_each_corner(&loc, |node, value, gradient| {
            stencil.push(node, value, gradient);
        });
        true
    }
}
