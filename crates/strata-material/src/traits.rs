//! Constitutive model trait, the stress law of a material.
//!
//! Every material model implements this trait, enabling the solver
//! to swap stress laws without changing its constitutive update logic.

use strata_math::Tensor;

/// Trait for constitutive models (material behavior).
///
/// The solver integrates strain as `ε ← ε + strain_rate(∇u) Δt` and then
/// evaluates `σ = stress(ε)`. Both calls are per particle and must be pure.
///
/// # Strategy Pattern
///
/// - `LinearElastic`: Small-strain isotropic Hooke's law
/// - `Impenetrable`: Rigid placeholder material that never builds stress
pub trait ConstitutiveModel: Send + Sync {
    /// Strain rate `ε̇` for a velocity gradient `∇u` with `(∇u)_jk = ∂u_j/∂x_k`.
    fn strain_rate(&self, velocity_gradient: &Tensor) -> Tensor;

    /// Cauchy stress for an accumulated strain.
    fn stress(&self, strain: &Tensor) -> Tensor;

    /// Returns the name of this constitutive model.
    fn name(&self) -> &str;
}

impl<M: ConstitutiveModel + ?Sized> ConstitutiveModel for Box<M> {
    fn strain_rate(&self, velocity_gradient: &Tensor) -> Tensor {
        (**self).strain_rate(velocity_gradient)
    }

    fn stress(&self, strain: &Tensor) -> Tensor {
        (**self).stress(strain)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
