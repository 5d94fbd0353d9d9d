//! Isotropic linear elastic constitutive model (Hooke's law).
//!
//! Small-strain model: the strain rate is the symmetric part of the
//! velocity gradient and the stress is linear in the accumulated strain.
//!
//! Stress: σ = λ tr(ε) I + 2μ ε

use strata_math::{symmetric_part, trace, Tensor};
use strata_types::{StrataError, StrataResult};

use crate::properties::ElasticProperties;
use crate::traits::ConstitutiveModel;

/// Isotropic linear elastic model parameterized by its Lamé constants.
///
/// # Limitations
///
/// Strain is accumulated additively from `sym(∇u)`, so rigid rotations
/// show up as spurious strain once they become large. Fine for the
/// small-deformation collision and stretch cases it is used for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearElastic {
    /// First Lamé parameter λ.
    lambda: f64,
    /// Shear modulus μ.
    mu: f64,
}

impl LinearElastic {
    /// Creates a model from Young's modulus `E` and Poisson's ratio `ν`.
    ///
    /// Requires `E > 0` and `-1 < ν < 0.5`.
    pub fn new(youngs_modulus: f64, poisson_ratio: f64) -> StrataResult<Self> {
        if !(youngs_modulus.is_finite() && youngs_modulus > 0.0) {
            return Err(StrataError::InvalidMaterial(format!(
                "Young's modulus must be positive, got {youngs_modulus}"
            )));
        }
        if !(poisson_ratio > -1.0 && poisson_ratio < 0.5) {
            return Err(StrataError::InvalidMaterial(format!(
                "Poisson's ratio must lie in (-1, 0.5), got {poisson_ratio}"
            )));
        }
        let e = youngs_modulus;
        let nu = poisson_ratio;
        Ok(Self {
            lambda: e * nu / ((1.0 + nu) * (1.0 - 2.0 * nu)),
            mu: e / (2.0 * (1.0 + nu)),
        })
    }

    /// Creates a model directly from Lamé parameters.
    pub fn from_lame(lambda: f64, mu: f64) -> StrataResult<Self> {
        if !(mu.is_finite() && mu > 0.0 && lambda.is_finite()) {
            return Err(StrataError::InvalidMaterial(format!(
                "Invalid Lamé parameters: λ = {lambda}, μ = {mu}"
            )));
        }
        Ok(Self { lambda, mu })
    }

    /// Creates a model from a preset's elastic constants.
    pub fn from_properties(props: &ElasticProperties) -> StrataResult<Self> {
        Self::new(props.youngs_modulus, props.poisson_ratio)
    }

    /// First Lamé parameter λ.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Shear modulus μ.
    pub fn mu(&self) -> f64 {
        self.mu
    }
}

impl ConstitutiveModel for LinearElastic {
    fn strain_rate(&self, velocity_gradient: &Tensor) -> Tensor {
        symmetric_part(velocity_gradient)
    }

    fn stress(&self, strain: &Tensor) -> Tensor {
        Tensor::IDENTITY * (self.lambda * trace(strain)) + *strain * (2.0 * self.mu)
    }

    fn name(&self) -> &str {
        "linear_elastic"
    }
}
