//! Impenetrable material: carries mass and momentum but never strains.

use strata_math::Tensor;

use crate::traits::ConstitutiveModel;

/// A material that moves with the grid but contributes no internal force.
///
/// Its strain rate and stress are identically zero, so particles of this
/// material only act through the mass and momentum they deposit on nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Impenetrable;

impl Impenetrable {
    pub fn new() -> Self {
        Self
    }
}

impl ConstitutiveModel for Impenetrable {
    fn strain_rate(&self, _velocity_gradient: &Tensor) -> Tensor {
        Tensor::ZERO
    }

    fn stress(&self, _strain: &Tensor) -> Tensor {
        Tensor::ZERO
    }

    fn name(&self) -> &str {
        "impenetrable"
    }
}
