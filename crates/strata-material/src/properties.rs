//! Physical material properties.
//!
//! These parameters are the measurable quantities a preset is described
//! by. They map to a constitutive model through [`ElasticProperties::build_model`].

use serde::{Deserialize, Serialize};
use strata_types::{StrataError, StrataResult};

use crate::elastic::LinearElastic;
use crate::impenetrable::Impenetrable;
use crate::traits::ConstitutiveModel;

/// Which stress law a set of properties describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    LinearElastic,
    Impenetrable,
}

/// Physical properties of a solid material.
///
/// | Property | Unit | Field |
/// |---|---|---|
/// | Young's modulus | Pa | `youngs_modulus` |
/// | Poisson's ratio | – | `poisson_ratio` |
/// | Mass density | kg/m³ (kg/m² in 2D) | `density` |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticProperties {
    /// Human-readable name (e.g., "steel").
    pub name: String,

    /// Stress law used for particles of this material.
    #[serde(default)]
    pub kind: ModelKind,

    /// Young's modulus `E`. Ignored by impenetrable materials.
    pub youngs_modulus: f64,

    /// Poisson's ratio `ν`. Ignored by impenetrable materials.
    pub poisson_ratio: f64,

    /// Mass density used to derive particle mass from sampled volume.
    pub density: f64,
}

impl ElasticProperties {
    /// Checks that the parameters describe a valid material.
    pub fn validate(&self) -> StrataResult<()> {
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(StrataError::InvalidMaterial(format!(
                "'{}': density must be positive, got {}",
                self.name, self.density
            )));
        }
        if self.kind == ModelKind::LinearElastic {
            LinearElastic::from_properties(self)
                .map_err(|e| StrataError::InvalidMaterial(format!("'{}': {e}", self.name)))?;
        }
        Ok(())
    }

    /// Builds the constitutive model these properties describe.
    pub fn build_model(&self) -> StrataResult<Box<dyn ConstitutiveModel>> {
        self.validate()?;
        Ok(match self.kind {
            ModelKind::LinearElastic => Box::new(LinearElastic::from_properties(self)?),
            ModelKind::Impenetrable => Box::new(Impenetrable::new()),
        })
    }

    /// Mass of a particle occupying `volume`.
    pub fn particle_mass(&self, volume: f64) -> f64 {
        self.density * volume
    }

    /// Dilatational (P-wave) speed `sqrt((λ + 2μ) / ρ)`.
    ///
    /// Useful for picking a stable `Δt ≲ h / c`. Returns `None` for
    /// impenetrable materials or invalid parameters.
    pub fn wave_speed(&self) -> Option<f64> {
        if self.kind != ModelKind::LinearElastic || self.density <= 0.0 {
            return None;
        }
        let model = LinearElastic::from_properties(self).ok()?;
        Some(((model.lambda() + 2.0 * model.mu()) / self.density).sqrt())
    }
}
