//! Procedural grids and particle samplers for scenarios and testing.
//!
//! Samplers place particles on a regular lattice at the centers of
//! `spacing`-sized sub-cells, so every particle of a block carries the
//! same share of volume ([`lattice_volume`]).

use strata_math::Vector;
use strata_types::constants::MAX_SOURCE_PARTICLES;
use strata_types::{Dimension, StrataResult};

use crate::rectilinear::RectilinearGrid;

/// Unit square `[0, 1]²` split into `n × n` cells.
///
/// # Example
/// ```
/// use strata_grid::generators::unit_square;
/// use strata_grid::GridSpace;
/// let grid = unit_square(2).unwrap();
/// assert_eq!(grid.node_count(), 9);
/// ```
pub fn unit_square(n: usize) -> StrataResult<RectilinearGrid> {
    RectilinearGrid::from_bounds(Dimension::Two, Vector::ZERO, Vector::ONE, [n, n, 0])
}

/// Unit cube `[0, 1]³` split into `n × n × n` cells.
pub fn unit_cube(n: usize) -> StrataResult<RectilinearGrid> {
    RectilinearGrid::from_bounds(Dimension::Three, Vector::ZERO, Vector::ONE, [n, n, n])
}

/// Volume carried by one lattice particle of the given spacing.
pub fn lattice_volume(spacing: f64, dimension: Dimension) -> f64 {
    spacing.powi(dimension.count() as i32)
}

/// Number of lattice points [`sample_box`] places in `[min, max]`.
///
/// Returns `None` when the count does not fit in a `usize`; a zero count
/// means the box is thinner than one spacing on some axis.
pub fn lattice_count(min: Vector, max: Vector, spacing: f64, dimension: Dimension) -> Option<usize> {
    lattice_counts(min, max, spacing, dimension)?
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
}

/// Per-axis lattice counts, `[1, 1, 1]` on inactive axes.
fn lattice_counts(min: Vector, max: Vector, spacing: f64, dimension: Dimension) -> Option<[usize; 3]> {
    if !(spacing.is_finite() && spacing > 0.0) {
        return Some([0; 3]);
    }
    let mut counts = [1usize; 3];
    for axis in 0..dimension.count() {
        let extent = max[axis] - min[axis];
        if extent.is_nan() || extent < spacing {
            return Some([0; 3]);
        }
        let n = (extent / spacing + 1e-9).floor();
        if !(n < usize::MAX as f64) {
            return None;
        }
        counts[axis] = n as usize;
    }
    Some(counts)
}

/// Lattice sample points filling the box `[min, max]`.
///
/// Points sit at sub-cell centers: `min + (i + ½)·spacing`.
/// Returns an empty vector if the box is thinner than one spacing or the
/// lattice would exceed [`MAX_SOURCE_PARTICLES`].
pub fn sample_box(min: Vector, max: Vector, spacing: f64, dimension: Dimension) -> Vec<Vector> {
    let Some(counts) = lattice_counts(min, max, spacing, dimension) else {
        return Vec::new();
    };
    let total = match counts.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n)) {
        Some(total) if total > 0 && total <= MAX_SOURCE_PARTICLES => total,
        _ => return Vec::new(),
    };

    let mut points = Vec::with_capacity(total);
    for k in 0..counts[2] {
        for j in 0..counts[1] {
            for i in 0..counts[0] {
                let mut p = Vector::new(
                    min.x + (i as f64 + 0.5) * spacing,
                    min.y + (j as f64 + 0.5) * spacing,
                    0.0,
                );
                if dimension == Dimension::Three {
                    p.z = min.z + (k as f64 + 0.5) * spacing;
                }
                points.push(p);
            }
        }
    }
    points
}

/// Lattice sample points inside a disk (2D) or ball (3D).
///
/// Uses the lattice of the bounding box, keeping points strictly inside
/// `radius` of `center`.
pub fn sample_disk(center: Vector, radius: f64, spacing: f64, dimension: Dimension) -> Vec<Vector> {
    let mut center = center;
    if dimension == Dimension::Two {
        center.z = 0.0;
    }
    let half = Vector::splat(radius);
    sample_box(center - half, center + half, spacing, dimension)
        .into_iter()
        .filter(|p| p.distance_squared(center) < radius * radius)
        .collect()
}
