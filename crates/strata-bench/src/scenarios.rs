//! Benchmark scenarios: a simulation input plus a step budget.
//!
//! Three canonical scenarios for regression testing:
//! 1. **Particle at rest**: one particle at a cell center, nothing moves
//! 2. **Colliding disks**: two elastic disks approach, collide, and rebound
//! 3. **Block impact**: an elastic block strikes an impenetrable slab

use serde::{Deserialize, Serialize};

use strata_io::{GridSpec, MaterialInput, ParticleSource, SimulationInput};
use strata_solver::SolverConfig;

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    ParticleAtRest,
    CollidingDisks,
    BlockImpact,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[
            ScenarioKind::ParticleAtRest,
            ScenarioKind::CollidingDisks,
            ScenarioKind::BlockImpact,
        ]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::ParticleAtRest => "particle_at_rest",
            ScenarioKind::CollidingDisks => "colliding_disks",
            ScenarioKind::BlockImpact => "block_impact",
        }
    }

    /// Parses a name produced by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.name() == name)
    }
}

/// A fully specified benchmark scenario.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub input: SimulationInput,
    /// Number of steps to run.
    pub steps: u64,
}

fn material(name: &str, preset: &str, velocity: [f64; 3], particles: ParticleSource) -> MaterialInput {
    MaterialInput {
        name: name.into(),
        preset: Some(preset.into()),
        properties: None,
        velocity,
        particles,
    }
}

fn solver(dt: f64) -> SolverConfig {
    SolverConfig {
        dt,
        ..SolverConfig::default()
    }
}

impl Scenario {
    /// One particle of mass 1 at the center of a single 2D cell.
    pub fn particle_at_rest() -> Self {
        Self {
            kind: ScenarioKind::ParticleAtRest,
            input: SimulationInput {
                solver: solver(0.01),
                grid: GridSpec::unit(1),
                materials: vec![material(
                    "particle",
                    "elastic_disk",
                    [0.0; 3],
                    ParticleSource::Explicit {
                        positions: vec![[0.5, 0.5, 0.0]],
                        masses: vec![1.0],
                    },
                )],
            },
            steps: 10,
        }
    }

    /// Two soft disks of radius 0.2 moving toward each other along the diagonal.
    ///
    /// Grid of 20 × 20 cells, four particles per cell per axis.
    pub fn colliding_disks() -> Self {
        let disk = |center: [f64; 3]| ParticleSource::Disk {
            center,
            radius: 0.2,
            spacing: 0.0125,
        };
        Self {
            kind: ScenarioKind::CollidingDisks,
            input: SimulationInput {
                solver: solver(0.001),
                grid: GridSpec::unit(20),
                materials: vec![
                    material("lower", "elastic_disk", [0.1, 0.1, 0.0], disk([0.25, 0.25, 0.0])),
                    material("upper", "elastic_disk", [-0.1, -0.1, 0.0], disk([0.75, 0.75, 0.0])),
                ],
            },
            steps: 3000,
        }
    }

    /// Soft block moving right into a stress-free impenetrable slab.
    pub fn block_impact() -> Self {
        Self {
            kind: ScenarioKind::BlockImpact,
            input: SimulationInput {
                solver: solver(0.001),
                grid: GridSpec::unit(20),
                materials: vec![
                    material(
                        "block",
                        "elastic_disk",
                        [0.1, 0.0, 0.0],
                        ParticleSource::Box {
                            min: [0.2, 0.4, 0.0],
                            max: [0.4, 0.6, 0.0],
                            spacing: 0.0125,
                        },
                    ),
                    material(
                        "slab",
                        "rigid",
                        [0.0; 3],
                        ParticleSource::Box {
                            min: [0.6, 0.2, 0.0],
                            max: [0.7, 0.8, 0.0],
                            spacing: 0.0125,
                        },
                    ),
                ],
            },
            steps: 1000,
        }
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::ParticleAtRest => Self::particle_at_rest(),
            ScenarioKind::CollidingDisks => Self::colliding_disks(),
            ScenarioKind::BlockImpact => Self::block_impact(),
        }
    }

    /// Overrides the step budget.
    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    /// Input whose end time is reached after exactly `steps` steps (at least one).
    pub fn resolved_input(&self) -> SimulationInput {
        let mut input = self.input.clone();
        let solver = &mut input.solver;
        solver.t_end = solver.t_start + (self.steps.max(1) as f64 - 0.5) * solver.dt;
        input
    }

    /// Enables or disables the rayon-backed stages.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.input.solver.parallel = parallel;
        self
    }
}
