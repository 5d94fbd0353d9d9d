//! Simulation context: the grid, nodal fields, materials, and step bookkeeping.
//!
//! Every stage function takes `&mut SimulationContext`. The context also
//! tracks which stages have completed in the current step so that a
//! stage called before its prerequisites fails with `StageOrder` instead
//! of reading stale data.

use strata_grid::{GridSpace, NodalFields};
use strata_math::Vector;
use strata_types::{Dimension, MaterialId, Stage, StrataError, StrataResult};

use crate::config::SolverConfig;
use crate::material::Material;
use crate::state::ParticleState;

/// Everything one simulation reads and writes.
///
/// The grid is borrowed for the context's whole lifetime; nodal fields
/// and materials are owned.
pub struct SimulationContext<'g> {
    space: &'g dyn GridSpace,
    pub nodes: NodalFields,
    pub materials: Vec<Material>,
    config: SolverConfig,
    step: u64,
    /// Bit mask of stages completed in the current step.
    completed: u32,
    /// Density and reference volume have been computed.
    initialized: bool,
}

/// Copy of all mutable state, taken at the start of a step.
#[derive(Debug, Clone)]
pub struct Checkpoint {
    particles: Vec<ParticleState>,
    nodes: NodalFields,
    initialized: bool,
}

impl<'g> SimulationContext<'g> {
    /// Creates a context over a grid. Fails if the config is invalid or
    /// its dimension disagrees with the grid.
    pub fn new(space: &'g dyn GridSpace, config: SolverConfig) -> StrataResult<Self> {
        config.validate()?;
        if space.dimension() != config.dimension {
            return Err(StrataError::Configuration(format!(
                "Grid is {} but solver is configured for {}",
                space.dimension(),
                config.dimension
            )));
        }
        if space.nodes_per_cell() > strata_types::constants::MAX_STENCIL_NODES {
            return Err(StrataError::Configuration(format!(
                "Grid cells have {} nodes; at most {} are supported",
                space.nodes_per_cell(),
                strata_types::constants::MAX_STENCIL_NODES
            )));
        }
        Ok(Self {
            nodes: NodalFields::from_space(space),
            space,
            materials: Vec::new(),
            config,
            step: 0,
            completed: 0,
            initialized: false,
        })
    }

    /// Adds a material and assigns its id.
    ///
    /// In 2D every position and velocity must have a zero z component.
    pub fn add_material(&mut self, mut material: Material) -> StrataResult<MaterialId> {
        if self.initialized {
            return Err(StrataError::Configuration(
                "Materials cannot be added after initialization".into(),
            ));
        }
        if self.config.dimension == Dimension::Two {
            let off_plane = |v: &Vector| v.z != 0.0;
            let particles = &material.particles;
            if let Some(p) = particles
                .position
                .iter()
                .chain(&particles.velocity)
                .position(off_plane)
            {
                return Err(StrataError::Configuration(format!(
                    "Material '{}' has out-of-plane data at particle {} in a 2D simulation",
                    material.name(),
                    p % particles.count.max(1)
                )));
            }
        }
        let index = u16::try_from(self.materials.len()).map_err(|_| {
            StrataError::Configuration("Too many materials in one simulation".into())
        })?;
        let id = MaterialId(index);
        material.set_id(id);
        self.materials.push(material);
        Ok(id)
    }

    /// The background grid.
    pub fn space(&self) -> &'g dyn GridSpace {
        self.space
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn dimension(&self) -> Dimension {
        self.config.dimension
    }

    pub fn dt(&self) -> f64 {
        self.config.dt
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.index())
    }

    /// Total particle count over all materials.
    pub fn particle_count(&self) -> usize {
        self.materials.iter().map(|m| m.particles.count).sum()
    }

    /// Total particle mass over all materials.
    pub fn particle_mass(&self) -> f64 {
        self.materials.iter().map(|m| m.particles.total_mass()).sum()
    }

    /// Whether density and reference volumes have been computed.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ─── Stage bookkeeping ───

    /// Starts a new step: records its index and clears the completed-stage mask.
    pub fn begin_step(&mut self, step: u64) {
        self.step = step;
        self.completed = 0;
    }

    /// Index of the current step.
    pub fn current_step(&self) -> u64 {
        self.step
    }

    /// Whether `stage` has completed in the current step.
    pub fn is_completed(&self, stage: Stage) -> bool {
        self.completed & stage.bit() != 0
    }

    /// Fails with `StageOrder` if any of `requires` has not run this step.
    pub(crate) fn require(&self, stage: Stage, requires: &[Stage]) -> StrataResult<()> {
        match requires.iter().find(|r| !self.is_completed(**r)) {
            Some(&missing) => Err(StrataError::StageOrder {
                stage,
                requires: missing,
            }),
            None => Ok(()),
        }
    }

    /// Fails with `StageOrder` unless the initialization stages have run.
    pub(crate) fn require_initialized(&self, stage: Stage) -> StrataResult<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(StrataError::StageOrder {
                stage,
                requires: Stage::InitialVolume,
            })
        }
    }

    pub(crate) fn complete(&mut self, stage: Stage) {
        self.completed |= stage.bit();
        tracing::trace!(step = self.step, stage = stage.name(), "stage complete");
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
    }

    // ─── Rollback ───

    /// Copies all mutable particle and grid state.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            particles: self.materials.iter().map(|m| m.particles.clone()).collect(),
            nodes: self.nodes.clone(),
            initialized: self.initialized,
        }
    }

    /// Restores state captured by [`checkpoint`](Self::checkpoint).
    pub fn restore(&mut self, checkpoint: Checkpoint) -> StrataResult<()> {
        if checkpoint.particles.len() != self.materials.len() {
            return Err(StrataError::Configuration(format!(
                "Checkpoint has {} materials, context has {}",
                checkpoint.particles.len(),
                self.materials.len()
            )));
        }
        self.nodes.restore_from(&checkpoint.nodes)?;
        for (material, particles) in self.materials.iter_mut().zip(checkpoint.particles) {
            material.particles = particles;
        }
        self.initialized = checkpoint.initialized;
        self.completed = 0;
        Ok(())
    }
}
