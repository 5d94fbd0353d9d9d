//! Constitutive and kinematic updates on particles.
//!
//! Initialization computes the grid volume estimate, particle density,
//! and reference volume once. Every step then composes the deformation
//! gradient, updates volume, and integrates strain into stress through
//! the material's [`ConstitutiveModel`](strata_material::ConstitutiveModel).

use std::f64::consts::PI;

use strata_math::{hadamard, restrict_tensor, Tensor};
use strata_types::{MaterialId, NodeId, ParticleId, Stage, StrataError, StrataResult};
use tracing::debug;

use crate::checks::Site;
use crate::config::DeformationUpdate;
use crate::context::SimulationContext;
use crate::parallel::{for_each, for_each_pair};

fn singular(material: MaterialId, p: usize, step: u64, determinant: f64) -> StrataError {
    StrataError::SingularDeformation {
        material,
        particle: ParticleId::from(p),
        step,
        determinant,
    }
}

/// Determinant of a deformation tensor, rejecting non-positive or non-finite values.
#[inline]
fn checked_determinant(f: &Tensor, material: MaterialId, p: usize, step: u64) -> StrataResult<f64> {
    let det = f.determinant();
    if det.is_finite() && det > 0.0 {
        Ok(det)
    } else {
        Err(singular(material, p, step, det))
    }
}

/// Nodal volume estimate `v_i = 4/3 π (h_i / 2)³` from the cell diameter.
pub fn calculate_grid_volume(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    let nodes = &mut ctx.nodes;
    for i in 0..nodes.node_count {
        let r = 0.5 * nodes.cell_diameter(NodeId::from(i));
        nodes.volume[i] = 4.0 / 3.0 * PI * r * r * r;
    }
    ctx.complete(Stage::GridVolume);
    Ok(())
}

/// Initial particle density `ρ_p = Σ_i φ_i m_i / v_i`.
pub fn calculate_material_density(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(Stage::Density, &[Stage::MassToGrid, Stage::GridVolume])?;
    let site = Site::new(Stage::Density, ctx.current_step());
    let parallel = ctx.config().parallel;
    let grid_mass = &ctx.nodes.mass;
    let grid_volume = &ctx.nodes.volume;

    for material in &mut ctx.materials {
        let id = material.id();
        let particles = &mut material.particles;
        let basis = &particles.basis;
        for_each(parallel, &mut particles.density, |p, rho| {
            let value: f64 = basis[p]
                .iter()
                .map(|(node, phi, _)| phi * grid_mass[node.index()] / grid_volume[node.index()])
                .sum();
            *rho = site.scalar(value, Site::particle_entity(id, p), "density")?;
            Ok(())
        })?;
    }

    ctx.complete(Stage::Density);
    Ok(())
}

/// Reference volume `V0_p = m_p / ρ_p` and current volume `V_p = det(F_p) V0_p`.
///
/// Fails with `SingularDeformation` if a density is not positive.
pub fn calculate_material_initial_volume(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(
        Stage::InitialVolume,
        &[Stage::Density, Stage::InitializeTensors],
    )?;
    let step = ctx.current_step();
    let parallel = ctx.config().parallel;

    for material in &mut ctx.materials {
        let id = material.id();
        let particles = &mut material.particles;
        let mass = &particles.mass;
        let density = &particles.density;
        let deformation = &particles.deformation_gradient;
        for_each_pair(
            parallel,
            &mut particles.initial_volume,
            &mut particles.volume,
            |p, v0, v| {
                let rho = density[p];
                if !(rho.is_finite() && rho > 0.0) {
                    return Err(singular(id, p, step, rho));
                }
                *v0 = mass[p] / rho;
                *v = checked_determinant(&deformation[p], id, p, step)? * *v0;
                Ok(())
            },
        )?;
    }

    ctx.mark_initialized();
    debug!(
        volume = ctx.materials.iter().map(|m| m.particles.total_volume()).sum::<f64>(),
        "initial volume"
    );
    ctx.complete(Stage::InitialVolume);
    Ok(())
}

/// First-step tensors: `dF = I + Δt ∇u`, `F = dF`, `ε = ε̇(∇u) Δt`, `σ = stress(ε)`.
pub fn initialize_material_tensors(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(Stage::InitializeTensors, &[Stage::VelocityGradient])?;
    let site = Site::new(Stage::InitializeTensors, ctx.current_step());
    let step = ctx.current_step();
    let parallel = ctx.config().parallel;
    let dimension = ctx.dimension();
    let dt = ctx.dt();

    for material in &mut ctx.materials {
        let id = material.id();
        let (model, particles) = material.split_mut();
        let grad_u = &particles.velocity_gradient;

        for_each_pair(
            parallel,
            &mut particles.deformation_increment,
            &mut particles.deformation_gradient,
            |p, df, f| {
                let increment = Tensor::IDENTITY + grad_u[p] * dt;
                checked_determinant(&increment, id, p, step)?;
                *df = increment;
                *f = increment;
                Ok(())
            },
        )?;

        for_each_pair(
            parallel,
            &mut particles.strain,
            &mut particles.stress,
            |p, eps, sigma| {
                let entity = Site::particle_entity(id, p);
                let rate = restrict_tensor(model.strain_rate(&grad_u[p]), dimension);
                *eps = site.tensor(rate * dt, entity, "strain")?;
                *sigma = site.tensor(restrict_tensor(model.stress(eps), dimension), entity, "stress")?;
                Ok(())
            },
        )?;
    }

    ctx.complete(Stage::InitializeTensors);
    Ok(())
}

/// `dF = I + Δt ∇u`, then `F ← dF · F` or `F ← dF ∘ F` per the config.
///
/// Fails with `SingularDeformation` when `det(dF)` or `det(F)` is not positive.
pub fn update_material_deformation_gradient(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(Stage::DeformationGradient, &[Stage::VelocityGradient])?;
    ctx.require_initialized(Stage::DeformationGradient)?;
    let step = ctx.current_step();
    let parallel = ctx.config().parallel;
    let rule = ctx.config().deformation_update;
    let dt = ctx.dt();

    for material in &mut ctx.materials {
        let id = material.id();
        let particles = &mut material.particles;
        let grad_u = &particles.velocity_gradient;
        for_each_pair(
            parallel,
            &mut particles.deformation_increment,
            &mut particles.deformation_gradient,
            |p, df, f| {
                let increment = Tensor::IDENTITY + grad_u[p] * dt;
                checked_determinant(&increment, id, p, step)?;
                let composed = match rule {
                    DeformationUpdate::Multiplicative => increment * *f,
                    DeformationUpdate::Hadamard => hadamard(&increment, f),
                };
                checked_determinant(&composed, id, p, step)?;
                *df = increment;
                *f = composed;
                Ok(())
            },
        )?;
    }

    ctx.complete(Stage::DeformationGradient);
    Ok(())
}

/// `V_p ← det(dF_p) V_p`.
pub fn update_material_volume(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(Stage::Volume, &[Stage::DeformationGradient])?;
    let step = ctx.current_step();
    let parallel = ctx.config().parallel;

    for material in &mut ctx.materials {
        let id = material.id();
        let particles = &mut material.particles;
        let increment = &particles.deformation_increment;
        for_each(parallel, &mut particles.volume, |p, v| {
            *v *= checked_determinant(&increment[p], id, p, step)?;
            Ok(())
        })?;
    }

    ctx.complete(Stage::Volume);
    Ok(())
}

/// Integrates strain `ε ← ε + ε̇(∇u) Δt` and evaluates `σ = stress(ε)`.
pub fn update_material_stress(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(Stage::Stress, &[Stage::VelocityGradient])?;
    ctx.require_initialized(Stage::Stress)?;
    let site = Site::new(Stage::Stress, ctx.current_step());
    let parallel = ctx.config().parallel;
    let dimension = ctx.dimension();
    let dt = ctx.dt();

    for material in &mut ctx.materials {
        let id = material.id();
        let (model, particles) = material.split_mut();
        let grad_u = &particles.velocity_gradient;
        for_each_pair(
            parallel,
            &mut particles.strain,
            &mut particles.stress,
            |p, eps, sigma| {
                let entity = Site::particle_entity(id, p);
                let rate = restrict_tensor(model.strain_rate(&grad_u[p]), dimension);
                *eps = site.tensor(*eps + rate * dt, entity, "strain")?;
                *sigma = site.tensor(restrict_tensor(model.stress(eps), dimension), entity, "stress")?;
                Ok(())
            },
        )?;
    }

    ctx.complete(Stage::Stress);
    Ok(())
}
