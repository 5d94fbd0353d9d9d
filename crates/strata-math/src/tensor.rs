//! Second-order tensor helpers.
//!
//! `glam` stores `DMat3` column-major, so entry `(row j, column k)` is
//! `m.col(k)[j]`. Gradients follow the continuum convention
//! `(∇u)_jk = ∂u_j / ∂x_k`.

use glam::{DMat3, DVec3};
use strata_types::Dimension;

/// Outer product `a ⊗ b`, i.e. the tensor with entries `a_j b_k`.
#[inline]
pub fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Element-wise (Hadamard) product `a ∘ b`.
#[inline]
pub fn hadamard(a: &DMat3, b: &DMat3) -> DMat3 {
    DMat3::from_cols(a.x_axis * b.x_axis, a.y_axis * b.y_axis, a.z_axis * b.z_axis)
}

/// Sum of the diagonal entries.
#[inline]
pub fn trace(m: &DMat3) -> f64 {
    m.x_axis.x + m.y_axis.y + m.z_axis.z
}

/// Symmetric part `(m + mᵀ) / 2`.
#[inline]
pub fn symmetric_part(m: &DMat3) -> DMat3 {
    (*m + m.transpose()) * 0.5
}

/// Largest absolute entry, used for min/max reporting.
pub fn max_abs(m: &DMat3) -> f64 {
    m.to_cols_array().iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// Zeroes the components that do not exist in the given dimension.
///
/// In 2D the third component of a vector is meaningless; basis gradients
/// and nodal vectors are projected through this before use.
#[inline]
pub fn restrict(v: DVec3, dimension: Dimension) -> DVec3 {
    match dimension {
        Dimension::Two => DVec3::new(v.x, v.y, 0.0),
        Dimension::Three => v,
    }
}

/// Keeps only the in-plane block of a tensor in 2D.
///
/// Velocity gradients, strains, and stresses of a planar problem have
/// zero third row and column.
#[inline]
pub fn restrict_tensor(m: DMat3, dimension: Dimension) -> DMat3 {
    match dimension {
        Dimension::Two => DMat3::from_cols(
            DVec3::new(m.x_axis.x, m.x_axis.y, 0.0),
            DVec3::new(m.y_axis.x, m.y_axis.y, 0.0),
            DVec3::ZERO,
        ),
        Dimension::Three => m,
    }
}

/// Flattens the first `dimension` components of each vector into one buffer.
pub fn flatten(vectors: &[DVec3], dimension: Dimension) -> Vec<f64> {
    let d = dimension.count();
    let mut out = Vec::with_capacity(vectors.len() * d);
    for v in vectors {
        out.extend_from_slice(&v.to_array()[..d]);
    }
    out
}
