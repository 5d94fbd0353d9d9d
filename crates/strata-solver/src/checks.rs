//! Finiteness guards run by every stage on the values it writes.

use strata_math::{Tensor, Vector};
use strata_types::{Entity, MaterialId, NodeId, ParticleId, Stage, StrataError, StrataResult};

/// Where a value was produced, for error context.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Site {
    pub stage: Stage,
    pub step: u64,
}

impl Site {
    pub fn new(stage: Stage, step: u64) -> Self {
        Self { stage, step }
    }

    fn divergence(&self, entity: Entity, field: &'static str) -> StrataError {
        StrataError::NumericalDivergence {
            stage: self.stage,
            step: self.step,
            entity,
            field,
        }
    }

    pub fn particle_entity(material: MaterialId, p: usize) -> Entity {
        Entity::Particle {
            material,
            particle: ParticleId::from(p),
        }
    }

    #[inline]
    pub fn scalar(&self, value: f64, entity: Entity, field: &'static str) -> StrataResult<f64> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.divergence(entity, field))
        }
    }

    #[inline]
    pub fn vector(&self, value: Vector, entity: Entity, field: &'static str) -> StrataResult<Vector> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.divergence(entity, field))
        }
    }

    #[inline]
    pub fn tensor(&self, value: Tensor, entity: Entity, field: &'static str) -> StrataResult<Tensor> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.divergence(entity, field))
        }
    }

    /// Checks a whole nodal vector field.
    pub fn nodal_vectors(&self, values: &[Vector], field: &'static str) -> StrataResult<()> {
        match values.iter().position(|v| !v.is_finite()) {
            Some(i) => Err(self.divergence(Entity::Node(NodeId::from(i)), field)),
            None => Ok(()),
        }
    }
}
