//! A material: one stress law plus the particles that follow it.

use strata_material::ConstitutiveModel;
use strata_types::MaterialId;

use crate::state::ParticleState;

/// Particles sharing one constitutive model.
pub struct Material {
    name: String,
    id: MaterialId,
    model: Box<dyn ConstitutiveModel>,
    /// Particle buffers; the particle count is fixed once added to a context.
    pub particles: ParticleState,
}

impl Material {
    /// Creates a material. The id is assigned when it joins a simulation.
    pub fn new(
        name: impl Into<String>,
        model: Box<dyn ConstitutiveModel>,
        particles: ParticleState,
    ) -> Self {
        Self {
            name: name.into(),
            id: MaterialId(0),
            model,
            particles,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: MaterialId) {
        self.id = id;
    }

    /// The stress law of this material.
    pub fn model(&self) -> &dyn ConstitutiveModel {
        self.model.as_ref()
    }

    /// Splits into the stress law and mutable particles.
    pub fn split_mut(&mut self) -> (&dyn ConstitutiveModel, &mut ParticleState) {
        (self.model.as_ref(), &mut self.particles)
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("model", &self.model.name())
            .field("particles", &self.particles.count)
            .finish()
    }
}
