//! Turns a validated [`SimulationInput`] into a grid and populated context.

use strata_grid::generators::{lattice_volume, sample_box, sample_disk};
use strata_grid::RectilinearGrid;
use strata_material::{ElasticProperties, MaterialLibrary};
use strata_math::Vector;
use strata_solver::{Material, ParticleState, SimulationContext};
use strata_types::{Dimension, StrataError, StrataResult};
use tracing::info;

use crate::contract::{MaterialInput, ParticleSource, SimulationInput};
use crate::validator::validate_input;

/// Builds the background grid described by the input.
pub fn build_grid(input: &SimulationInput) -> StrataResult<RectilinearGrid> {
    let grid = &input.grid;
    RectilinearGrid::from_bounds(
        input.solver.dimension,
        Vector::from_array(grid.min),
        Vector::from_array(grid.max),
        grid.cells,
    )
}

/// Builds one [`Material`] per input entry, resolving presets from `library`.
pub fn build_materials(
    input: &SimulationInput,
    library: &MaterialLibrary,
) -> StrataResult<Vec<Material>> {
    let dimension = input.solver.dimension;
    input
        .materials
        .iter()
        .map(|entry| build_material(entry, library, dimension))
        .collect()
}

/// Validates the input and assembles a context over `grid`.
pub fn build_context<'g>(
    input: &SimulationInput,
    grid: &'g RectilinearGrid,
    library: &MaterialLibrary,
) -> StrataResult<SimulationContext<'g>> {
    validate_input(input)?;
    let mut ctx = SimulationContext::new(grid, input.solver.clone())?;
    for material in build_materials(input, library)? {
        ctx.add_material(material)?;
    }
    info!(
        materials = ctx.materials.len(),
        particles = ctx.particle_count(),
        mass = ctx.particle_mass(),
        "scene built"
    );
    Ok(ctx)
}

fn resolve_properties<'a>(
    entry: &'a MaterialInput,
    library: &'a MaterialLibrary,
) -> StrataResult<&'a ElasticProperties> {
    match (&entry.properties, &entry.preset) {
        (Some(props), _) => Ok(props),
        (None, Some(preset)) => library.get(preset).ok_or_else(|| {
            StrataError::InvalidMaterial(format!(
                "unknown preset `{preset}` for material `{}` (available: {})",
                entry.name,
                library.names().join(", ")
            ))
        }),
        (None, None) => Err(StrataError::Configuration(format!(
            "material `{}` needs a preset or properties",
            entry.name
        ))),
    }
}

fn build_material(
    entry: &MaterialInput,
    library: &MaterialLibrary,
    dimension: Dimension,
) -> StrataResult<Material> {
    let props = resolve_properties(entry, library)?;
    let model = props.build_model()?;
    let velocity = Vector::from_array(entry.velocity);

    let particles = match &entry.particles {
        ParticleSource::Explicit { positions, masses } => {
            let positions = positions.iter().copied().map(Vector::from_array).collect();
            ParticleState::new(positions, vec![velocity; masses.len()], masses.clone())?
        }
        ParticleSource::Box { min, max, spacing } => {
            let points = sample_box(
                Vector::from_array(*min),
                Vector::from_array(*max),
                *spacing,
                dimension,
            );
            lattice_particles(entry, props, points, velocity, *spacing, dimension)?
        }
        ParticleSource::Disk {
            center,
            radius,
            spacing,
        } => {
            let points = sample_disk(Vector::from_array(*center), *radius, *spacing, dimension);
            lattice_particles(entry, props, points, velocity, *spacing, dimension)?
        }
    };

    Ok(Material::new(entry.name.clone(), model, particles))
}

fn lattice_particles(
    entry: &MaterialInput,
    props: &ElasticProperties,
    points: Vec<Vector>,
    velocity: Vector,
    spacing: f64,
    dimension: Dimension,
) -> StrataResult<ParticleState> {
    if points.is_empty() {
        return Err(StrataError::Configuration(format!(
            "material `{}` produced no particles at spacing {spacing}",
            entry.name
        )));
    }
    let mass = props.particle_mass(lattice_volume(spacing, dimension));
    ParticleState::uniform(points, velocity, mass)
}
