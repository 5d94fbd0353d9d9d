//! Particle state: SoA buffers for all per-particle data.
//!
//! This is the primary mutable data structure during simulation.
//! Every stage reads and writes these buffers by particle index; the
//! index of a particle never changes during a run.

use strata_grid::BasisStencil;
use strata_math::{Tensor, Vector};
use strata_types::{StrataError, StrataResult};

/// SoA particle buffers of one material.
///
/// # Layout
///
/// All arrays have length `count`. Tensors start at their rest values
/// (`F = dF = I`, `∇u = ε = σ = 0`); density and volumes are zero until
/// the initialization stage computes them.
#[derive(Debug, Clone)]
pub struct ParticleState {
    /// Number of particles.
    pub count: usize,

    // ─── Kinematics ───
    pub position: Vec<Vector>,
    pub velocity: Vec<Vector>,
    /// Grid velocity interpolated back to the particle (`u*`).
    pub intermediate_velocity: Vec<Vector>,
    pub acceleration: Vec<Vector>,

    // ─── Mass and volume ───
    /// Particle mass; fixed for the run.
    pub mass: Vec<f64>,
    pub density: Vec<f64>,
    pub volume: Vec<f64>,
    /// Reference volume `V0`.
    pub initial_volume: Vec<f64>,

    // ─── Tensors ───
    pub deformation_gradient: Vec<Tensor>,
    pub deformation_increment: Vec<Tensor>,
    pub velocity_gradient: Vec<Tensor>,
    pub strain: Vec<Tensor>,
    pub stress: Vec<Tensor>,

    /// Basis functions of the current step.
    pub basis: Vec<BasisStencil>,
}

impl ParticleState {
    /// Creates particle buffers from positions, velocities, and masses.
    ///
    /// All arrays must have the same length, masses must be positive,
    /// and every value must be finite.
    pub fn new(position: Vec<Vector>, velocity: Vec<Vector>, mass: Vec<f64>) -> StrataResult<Self> {
        let n = position.len();
        if velocity.len() != n || mass.len() != n {
            return Err(StrataError::Configuration(format!(
                "Particle arrays disagree: {} positions, {} velocities, {} masses",
                n,
                velocity.len(),
                mass.len()
            )));
        }
        if let Some(p) = position.iter().position(|x| !x.is_finite()) {
            return Err(StrataError::Configuration(format!(
                "Particle {p} has a non-finite position"
            )));
        }
        if let Some(p) = velocity.iter().position(|u| !u.is_finite()) {
            return Err(StrataError::Configuration(format!(
                "Particle {p} has a non-finite velocity"
            )));
        }
        if let Some(p) = mass.iter().position(|&m| !(m.is_finite() && m > 0.0)) {
            return Err(StrataError::Configuration(format!(
                "Particle {p} has non-positive mass {}",
                mass[p]
            )));
        }

        Ok(Self {
            count: n,
            intermediate_velocity: velocity.clone(),
            position,
            velocity,
            acceleration: vec![Vector::ZERO; n],
            mass,
            density: vec![0.0; n],
            volume: vec![0.0; n],
            initial_volume: vec![0.0; n],
            deformation_gradient: vec![Tensor::IDENTITY; n],
            deformation_increment: vec![Tensor::IDENTITY; n],
            velocity_gradient: vec![Tensor::ZERO; n],
            strain: vec![Tensor::ZERO; n],
            stress: vec![Tensor::ZERO; n],
            basis: vec![BasisStencil::new(); n],
        })
    }

    /// Creates particles at rest.
    pub fn at_rest(position: Vec<Vector>, mass: Vec<f64>) -> StrataResult<Self> {
        let n = position.len();
        Self::new(position, vec![Vector::ZERO; n], mass)
    }

    /// Creates particles of equal mass sharing one velocity.
    pub fn uniform(position: Vec<Vector>, velocity: Vector, mass: f64) -> StrataResult<Self> {
        let n = position.len();
        Self::new(position, vec![velocity; n], vec![mass; n])
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Sum of particle mass.
    pub fn total_mass(&self) -> f64 {
        self.mass.iter().sum()
    }

    /// Sum of current particle volume.
    pub fn total_volume(&self) -> f64 {
        self.volume.iter().sum()
    }

    /// Total momentum `Σ m u`.
    pub fn momentum(&self) -> Vector {
        self.mass
            .iter()
            .zip(&self.velocity)
            .map(|(&m, &u)| u * m)
            .sum()
    }

    /// Kinetic energy: `½ Σ m |u|²`.
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self
            .mass
            .iter()
            .zip(&self.velocity)
            .map(|(&m, u)| m * u.length_squared())
            .sum::<f64>()
    }

    /// Largest `|V - det(F) V0| / V0` over all particles with a reference volume.
    pub fn volume_consistency_error(&self) -> f64 {
        (0..self.count)
            .filter(|&p| self.initial_volume[p] > 0.0)
            .map(|p| {
                let expected = self.deformation_gradient[p].determinant() * self.initial_volume[p];
                (self.volume[p] - expected).abs() / self.initial_volume[p]
            })
            .fold(0.0, f64::max)
    }
}
