//! Field statistics and conservation checks.
//!
//! [`FieldRange`] reports the min/max of a field, which is the quickest
//! way to spot where a run starts to diverge. The integrator logs the
//! ranges of every particle and nodal field at `debug` level.

use serde::{Deserialize, Serialize};
use strata_grid::NodalFields;
use strata_math::tensor::max_abs;
use strata_math::{Tensor, Vector};

use crate::context::SimulationContext;
use crate::state::ParticleState;

/// Minimum and maximum of one field.
///
/// Vector fields are measured by magnitude and tensor fields by their
/// largest absolute entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub name: String,
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    /// Range of a scalar field. Empty fields give `[0, 0]`.
    pub fn of_scalars(name: &str, values: &[f64]) -> Self {
        let (min, max) = min_max(values.iter().copied());
        Self {
            name: name.to_string(),
            min,
            max,
        }
    }

    /// Range of vector magnitudes.
    pub fn of_vectors(name: &str, values: &[Vector]) -> Self {
        let (min, max) = min_max(values.iter().map(|v| v.length()));
        Self {
            name: name.to_string(),
            min,
            max,
        }
    }

    /// Range of the largest absolute entry of each tensor.
    pub fn of_tensors(name: &str, values: &[Tensor]) -> Self {
        let (min, max) = min_max(values.iter().map(max_abs));
        Self {
            name: name.to_string(),
            min,
            max,
        }
    }
}

impl std::fmt::Display for FieldRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <min, max> : <{:.6e}, {:.6e}>", self.name, self.min, self.max)
    }
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if min > max {
        (0.0, 0.0)
    } else {
        (min, max)
    }
}

/// Ranges of every particle field of one material.
pub fn particle_ranges(particles: &ParticleState) -> Vec<FieldRange> {
    vec![
        FieldRange::of_vectors("x", &particles.position),
        FieldRange::of_vectors("u", &particles.velocity),
        FieldRange::of_vectors("a", &particles.acceleration),
        FieldRange::of_scalars("rho", &particles.density),
        FieldRange::of_scalars("V", &particles.volume),
        FieldRange::of_tensors("F", &particles.deformation_gradient),
        FieldRange::of_tensors("grad_u", &particles.velocity_gradient),
        FieldRange::of_tensors("epsilon", &particles.strain),
        FieldRange::of_tensors("sigma", &particles.stress),
    ]
}

/// Ranges of every nodal field.
pub fn node_ranges(nodes: &NodalFields) -> Vec<FieldRange> {
    vec![
        FieldRange::of_scalars("m", &nodes.mass),
        FieldRange::of_vectors("U", &nodes.velocity),
        FieldRange::of_vectors("a", &nodes.acceleration),
        FieldRange::of_vectors("f_int", &nodes.internal_force),
    ]
}

/// Conservation and energy summary of a context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conservation {
    /// `Σ m_p` over all materials.
    pub particle_mass: f64,
    /// `Σ m_i` over all nodes.
    pub grid_mass: f64,
    /// `Σ m_p u_p`.
    pub particle_momentum: [f64; 3],
    /// `½ Σ m_p |u_p|²`.
    pub kinetic_energy: f64,
}

impl Conservation {
    /// Measures the current state.
    pub fn measure(ctx: &SimulationContext<'_>) -> Self {
        let momentum: Vector = ctx.materials.iter().map(|m| m.particles.momentum()).sum();
        Self {
            particle_mass: ctx.particle_mass(),
            grid_mass: ctx.nodes.total_mass(),
            particle_momentum: momentum.to_array(),
            kinetic_energy: kinetic_energy(ctx),
        }
    }

    /// Relative difference between grid and particle mass.
    pub fn mass_error(&self) -> f64 {
        if self.particle_mass == 0.0 {
            return self.grid_mass.abs();
        }
        (self.grid_mass - self.particle_mass).abs() / self.particle_mass
    }
}

/// Kinetic energy of all particles.
pub fn kinetic_energy(ctx: &SimulationContext<'_>) -> f64 {
    ctx.materials
        .iter()
        .map(|m| m.particles.kinetic_energy())
        .sum()
}

/// Largest relative `|V - det(F) V0| / V0` over all materials.
pub fn volume_consistency_error(ctx: &SimulationContext<'_>) -> f64 {
    ctx.materials
        .iter()
        .map(|m| m.particles.volume_consistency_error())
        .fold(0.0, f64::max)
}

/// Logs particle and nodal field ranges at `debug` level.
pub(crate) fn log_ranges(ctx: &SimulationContext<'_>) {
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }
    for material in &ctx.materials {
        for range in particle_ranges(&material.particles) {
            tracing::debug!(material = material.name(), "{range}");
        }
    }
    for range in node_ranges(&ctx.nodes) {
        tracing::debug!(target: "strata::grid", "{range}");
    }
}
