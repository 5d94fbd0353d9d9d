//! Integration tests for strata-math.

use strata_math::tensor::{flatten, max_abs, restrict};
use strata_math::{hadamard, outer, symmetric_part, trace, Tensor, Vector};
use strata_types::Dimension;

// ─── Outer / Hadamard Tests ───────────────────────────────────

#[test]
fn outer_product_entries() {
    let a = Vector::new(1.0, 2.0, 3.0);
    let b = Vector::new(4.0, 5.0, 6.0);
    let m = outer(a, b);
    // (a ⊗ b)_jk = a_j b_k, column k holds a * b_k
    assert_eq!(m.col(0), Vector::new(4.0, 8.0, 12.0));
    assert_eq!(m.col(2), Vector::new(6.0, 12.0, 18.0));
    assert_eq!(m.col(1)[0], a.x * b.y);
}

#[test]
fn outer_product_applied_to_vector() {
    let a = Vector::new(1.0, -1.0, 0.0);
    let b = Vector::new(0.0, 2.0, 0.0);
    let v = Vector::new(0.0, 3.0, 0.0);
    // (a ⊗ b) v = a (b · v)
    let lhs = outer(a, b) * v;
    let rhs = a * b.dot(v);
    assert!((lhs - rhs).length() < 1e-12);
}

#[test]
fn hadamard_with_identity_keeps_diagonal() {
    let m = Tensor::from_cols_array(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    let h = hadamard(&m, &Tensor::IDENTITY);
    assert_eq!(h, Tensor::from_diagonal(Vector::new(1.0, 5.0, 9.0)));
}

#[test]
fn hadamard_differs_from_matrix_product_for_shear() {
    let shear = Tensor::from_cols(
        Vector::new(1.0, 0.0, 0.0),
        Vector::new(0.5, 1.0, 0.0),
        Vector::new(0.0, 0.0, 1.0),
    );
    let h = hadamard(&shear, &shear);
    let p = shear * shear;
    assert!((h.col(1)[0] - 0.25).abs() < 1e-12);
    assert!((p.col(1)[0] - 1.0).abs() < 1e-12);
}

// ─── Trace / Symmetric Tests ──────────────────────────────────

#[test]
fn trace_of_identity() {
    assert_eq!(trace(&Tensor::IDENTITY), 3.0);
}

#[test]
fn symmetric_part_is_symmetric() {
    let m = Tensor::from_cols_array(&[1.0, 2.0, 0.0, 4.0, 5.0, 0.0, 0.0, 0.0, 1.0]);
    let s = symmetric_part(&m);
    assert_eq!(s, s.transpose());
    assert!((s.col(1)[0] - 3.0).abs() < 1e-12);
    assert_eq!(trace(&s), trace(&m));
}

#[test]
fn max_abs_entry() {
    let m = Tensor::from_diagonal(Vector::new(-4.0, 2.0, 1.0));
    assert_eq!(max_abs(&m), 4.0);
}

// ─── Dimension helpers ────────────────────────────────────────

#[test]
fn restrict_drops_third_component_in_2d() {
    let v = Vector::new(1.0, 2.0, 3.0);
    assert_eq!(restrict(v, Dimension::Two), Vector::new(1.0, 2.0, 0.0));
    assert_eq!(restrict(v, Dimension::Three), v);
}

#[test]
fn flatten_interleaves_components() {
    let vs = [Vector::new(1.0, 2.0, 9.0), Vector::new(3.0, 4.0, 9.0)];
    assert_eq!(flatten(&vs, Dimension::Two), vec![1.0, 2.0, 3.0, 4.0]);
    assert_eq!(flatten(&vs, Dimension::Three).len(), 6);
}

#[test]
fn restrict_tensor_keeps_in_plane_block() {
    let m = Tensor::from_cols_array(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    let r = strata_math::restrict_tensor(m, Dimension::Two);
    assert_eq!(r.x_axis, Vector::new(1.0, 2.0, 0.0));
    assert_eq!(r.y_axis, Vector::new(4.0, 5.0, 0.0));
    assert_eq!(r.z_axis, Vector::ZERO);
    assert_eq!(strata_math::restrict_tensor(m, Dimension::Three), m);
}
