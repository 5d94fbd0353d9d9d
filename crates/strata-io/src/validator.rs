//! Input validation.
//!
//! Validates simulation inputs before the solver receives them,
//! catching data-level errors early with clear diagnostics.

use std::collections::HashSet;

use strata_grid::generators::lattice_count;
use strata_math::Vector;
use strata_types::constants::MAX_SOURCE_PARTICLES;
use strata_types::{Dimension, StrataError, StrataResult};

use crate::contract::{GridSpec, MaterialInput, ParticleSource, SimulationInput};

/// Validates a complete simulation input.
///
/// Checks:
/// - Solver parameters (`Δt`, times, mass floor)
/// - Grid bounds and cell counts on every active axis
/// - Material names are unique and each names exactly one property source
/// - Particle sources are well-formed and planar in 2D
/// - Sampled sources stay under [`MAX_SOURCE_PARTICLES`]
pub fn validate_input(input: &SimulationInput) -> StrataResult<()> {
    input.solver.validate()?;
    let dimension = input.solver.dimension;
    validate_grid(&input.grid, dimension)?;

    if input.materials.is_empty() {
        return Err(config("at least one material is required"));
    }
    let mut names = HashSet::new();
    for material in &input.materials {
        if !names.insert(material.name.as_str()) {
            return Err(config(format!("duplicate material name `{}`", material.name)));
        }
        validate_material(material, dimension)?;
    }
    Ok(())
}

fn config(msg: impl Into<String>) -> StrataError {
    StrataError::Configuration(msg.into())
}

fn validate_grid(grid: &GridSpec, dimension: Dimension) -> StrataResult<()> {
    for axis in 0..dimension.count() {
        if grid.cells[axis] == 0 {
            return Err(config(format!("grid needs at least one cell on axis {axis}")));
        }
        let (lo, hi) = (grid.min[axis], grid.max[axis]);
        if !(lo.is_finite() && hi.is_finite() && hi > lo) {
            return Err(config(format!("grid bounds on axis {axis} are empty: [{lo}, {hi}]")));
        }
    }
    Ok(())
}

fn validate_material(material: &MaterialInput, dimension: Dimension) -> StrataResult<()> {
    let name = &material.name;
    match (&material.preset, &material.properties) {
        (Some(_), Some(_)) => {
            return Err(config(format!("material `{name}` sets both a preset and properties")))
        }
        (None, None) => {
            return Err(config(format!("material `{name}` needs a preset or properties")))
        }
        (None, Some(props)) => props.validate()?,
        (Some(_), None) => {}
    }

    if material.velocity.iter().any(|v| !v.is_finite()) {
        return Err(config(format!("material `{name}` has a non-finite velocity")));
    }
    let planar = |p: &[f64; 3]| dimension == Dimension::Three || p[2] == 0.0;
    if !planar(&material.velocity) {
        return Err(config(format!("material `{name}` has out-of-plane velocity in 2D")));
    }

    match &material.particles {
        ParticleSource::Explicit { positions, masses } => {
            if positions.is_empty() {
                return Err(config(format!("material `{name}` has no particles")));
            }
            if positions.len() != masses.len() {
                return Err(config(format!(
                    "material `{name}`: {} positions but {} masses",
                    positions.len(),
                    masses.len()
                )));
            }
            if !positions.iter().all(planar) {
                return Err(config(format!("material `{name}` has out-of-plane particles in 2D")));
            }
        }
        ParticleSource::Box { min, max, spacing } => {
            check_spacing(name, *spacing)?;
            for axis in 0..dimension.count() {
                if !(max[axis] > min[axis]) {
                    return Err(config(format!("material `{name}` has an empty box on axis {axis}")));
                }
            }
            let (min, max) = (Vector::from_array(*min), Vector::from_array(*max));
            check_lattice_size(name, min, max, *spacing, dimension)?;
        }
        ParticleSource::Disk {
            center,
            radius,
            spacing,
        } => {
            check_spacing(name, *spacing)?;
            if !(radius.is_finite() && *radius > 0.0) {
                return Err(config(format!("material `{name}` needs a positive radius")));
            }
            if !planar(center) {
                return Err(config(format!("material `{name}` disk center is out of plane in 2D")));
            }
            let center = Vector::from_array(*center);
            let half = Vector::splat(*radius);
            check_lattice_size(name, center - half, center + half, *spacing, dimension)?;
        }
    }
    Ok(())
}

fn check_spacing(name: &str, spacing: f64) -> StrataResult<()> {
    if spacing.is_finite() && spacing > 0.0 {
        Ok(())
    } else {
        Err(config(format!("material `{name}` needs a positive particle spacing")))
    }
}

/// Bounds the lattice a sampled source expands to.
fn check_lattice_size(
    name: &str,
    min: Vector,
    max: Vector,
    spacing: f64,
    dimension: Dimension,
) -> StrataResult<()> {
    match lattice_count(min, max, spacing, dimension) {
        Some(count) if count <= MAX_SOURCE_PARTICLES => Ok(()),
        _ => Err(config(format!(
            "material `{name}` samples more than {MAX_SOURCE_PARTICLES} particles; increase the spacing"
        ))),
    }
}
