//! Simulation input/output contract types.
//!
//! These types define the I/O boundary of the Strata engine. They are
//! serializable so a run can be described in a TOML or JSON file and its
//! outcome exported as JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_material::ElasticProperties;
use strata_math::tensor::max_abs;
use strata_solver::{RunSummary, SimulationContext, SolverConfig};
use strata_types::{StrataError, StrataResult};

/// Complete description of a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationInput {
    /// Time stepping, dimension, and numerical options.
    #[serde(default)]
    pub solver: SolverConfig,
    /// Background grid.
    pub grid: GridSpec,
    /// Materials and the particles that discretize them.
    pub materials: Vec<MaterialInput>,
}

impl SimulationInput {
    /// Parses an input description from TOML.
    pub fn from_toml_str(src: &str) -> StrataResult<Self> {
        toml::from_str(src).map_err(|e| StrataError::Serialization(e.to_string()))
    }

    /// Parses an input description from JSON.
    pub fn from_json_str(src: &str) -> StrataResult<Self> {
        serde_json::from_str(src).map_err(|e| StrataError::Serialization(e.to_string()))
    }

    /// Loads an input file, choosing the format by extension (`.json` or TOML).
    pub fn load(path: &Path) -> StrataResult<Self> {
        let src = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&src),
            _ => Self::from_toml_str(&src),
        }
    }
}

/// Axis-aligned rectilinear background grid.
///
/// In 2D the third components are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub cells: [usize; 3],
}

impl GridSpec {
    /// `[0, 1]^d` split into `n` cells per axis.
    pub fn unit(n: usize) -> Self {
        Self {
            min: [0.0; 3],
            max: [1.0; 3],
            cells: [n; 3],
        }
    }
}

/// One material of a run.
///
/// Properties come either from a library `preset` or inline `properties`;
/// exactly one must be given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ElasticProperties>,
    /// Initial velocity shared by every particle.
    #[serde(default)]
    pub velocity: [f64; 3],
    pub particles: ParticleSource,
}

/// How the particles of a material are placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ParticleSource {
    /// Explicit positions with per-particle masses.
    Explicit {
        positions: Vec<[f64; 3]>,
        masses: Vec<f64>,
    },
    /// Box filled on a regular lattice; masses follow from density.
    Box {
        min: [f64; 3],
        max: [f64; 3],
        spacing: f64,
    },
    /// Disk (2D) or ball (3D) filled on a regular lattice.
    Disk {
        center: [f64; 3],
        radius: f64,
        spacing: f64,
    },
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub steps: u64,
    pub sim_time: f64,
    pub wall_time_seconds: f64,
    pub mean_step_seconds: f64,
    pub stopped: bool,
    pub final_kinetic_energy: f64,
    pub materials: Vec<MaterialReport>,
}

/// Final per-material state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaterialReport {
    pub name: String,
    pub model: String,
    pub particles: usize,
    pub mass: f64,
    pub volume: f64,
    /// Largest stress component magnitude over all particles.
    pub max_stress: f64,
    /// Largest `|V − det(F) V0| / V0` over all particles.
    pub volume_consistency_error: f64,
}

impl SimulationReport {
    pub fn new(summary: &RunSummary, ctx: &SimulationContext<'_>) -> Self {
        let materials = ctx
            .materials
            .iter()
            .map(|m| {
                let p = &m.particles;
                MaterialReport {
                    name: m.name().to_string(),
                    model: m.model().name().to_string(),
                    particles: p.len(),
                    mass: p.total_mass(),
                    volume: p.total_volume(),
                    max_stress: p.stress.iter().map(max_abs).fold(0.0, f64::max),
                    volume_consistency_error: p.volume_consistency_error(),
                }
            })
            .collect();
        Self {
            steps: summary.steps,
            sim_time: summary.sim_time,
            wall_time_seconds: summary.wall_time,
            mean_step_seconds: summary.mean_step_time,
            stopped: summary.stopped,
            final_kinetic_energy: summary.final_kinetic_energy,
            materials,
        }
    }

    pub fn to_json(&self) -> StrataResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StrataError::Serialization(e.to_string()))
    }
}
