//! Particle ↔ grid transfers.
//!
//! Basis formulation, particle-to-grid (P2G) mass and momentum
//! transfer, grid-to-particle (G2P) interpolation, the particle velocity
//! gradient, and advection. P2G sums go through [`scatter`]; every
//! other stage updates particles independently.

use strata_math::{outer, restrict, restrict_tensor, Tensor, Vector};
use strata_types::constants::PARTITION_TOLERANCE;
use strata_types::{ParticleId, Stage, StrataError, StrataResult};
use tracing::debug;

use crate::checks::Site;
use crate::context::SimulationContext;
use crate::parallel::{for_each, for_each_pair, scatter};

/// Locates every particle and caches its basis values and gradients.
///
/// Fails with `OutOfDomainParticle` for the first particle outside the grid.
pub fn formulate_basis_functions(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    let step = ctx.current_step();
    let space = ctx.space();
    let parallel = ctx.config().parallel;

    for material in &mut ctx.materials {
        let id = material.id();
        let particles = &mut material.particles;
        let position = &particles.position;
        for_each(parallel, &mut particles.basis, |p, stencil| {
            let x = position[p];
            if !space.evaluate_basis(x, stencil) {
                return Err(StrataError::OutOfDomainParticle {
                    material: id,
                    particle: ParticleId::from(p),
                    position: x.to_array(),
                    step,
                });
            }
            debug_assert!((stencil.value_sum() - 1.0).abs() < PARTITION_TOLERANCE);
            Ok(())
        })?;
    }

    ctx.complete(Stage::FormulateBasis);
    Ok(())
}

/// Resets nodal mass and accumulates `m_i = Σ_p φ_i(x_p) m_p`.
pub fn interpolate_mass_to_grid(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(Stage::MassToGrid, &[Stage::FormulateBasis])?;
    let parallel = ctx.config().parallel;
    let n = ctx.nodes.node_count;

    ctx.nodes.mass.fill(0.0);
    for material in &ctx.materials {
        let particles = &material.particles;
        let mass = scatter(parallel, particles.count, n, |p, buffer: &mut [f64]| {
            let m = particles.mass[p];
            for (node, phi, _) in particles.basis[p].iter() {
                buffer[node.index()] += phi * m;
            }
        });
        for (total, m) in ctx.nodes.mass.iter_mut().zip(mass) {
            *total += m;
        }
    }

    debug!(grid_mass = ctx.nodes.total_mass(), "mass to grid");
    ctx.complete(Stage::MassToGrid);
    Ok(())
}

/// Nodal velocity `u_i = Σ_p φ_i m_p u_p / max(m_i, ε)`.
///
/// Returns the number of nodes that carry mass below the floor.
pub fn interpolate_velocity_to_grid(ctx: &mut SimulationContext<'_>) -> StrataResult<usize> {
    ctx.require(Stage::VelocityToGrid, &[Stage::MassToGrid])?;
    let site = Site::new(Stage::VelocityToGrid, ctx.current_step());
    let parallel = ctx.config().parallel;
    let floor = ctx.config().mass_floor;
    let dimension = ctx.dimension();
    let n = ctx.nodes.node_count;

    let mut momentum = vec![Vector::ZERO; n];
    for material in &ctx.materials {
        let particles = &material.particles;
        let contribution = scatter(parallel, particles.count, n, |p, buffer: &mut [Vector]| {
            let mu = particles.velocity[p] * particles.mass[p];
            for (node, phi, _) in particles.basis[p].iter() {
                buffer[node.index()] += mu * phi;
            }
        });
        for (total, q) in momentum.iter_mut().zip(contribution) {
            *total += q;
        }
    }

    let nodes = &mut ctx.nodes;
    let mut floored = 0;
    for (i, q) in momentum.into_iter().enumerate() {
        let m = nodes.mass[i];
        if m > 0.0 && m < floor {
            floored += 1;
        }
        nodes.velocity[i] = restrict(q / m.max(floor), dimension);
    }
    site.nodal_vectors(&nodes.velocity, "grid velocity")?;

    if floored > 0 {
        debug!(floored, "grid mass floored during velocity transfer");
    }
    ctx.complete(Stage::VelocityToGrid);
    Ok(floored)
}

/// Interpolates grid velocity to the particles: `u*_p = Σ_i φ_i u_i`.
pub fn interpolate_velocity_to_material(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(Stage::VelocityToMaterial, &[Stage::GridVelocity])?;
    let site = Site::new(Stage::VelocityToMaterial, ctx.current_step());
    let parallel = ctx.config().parallel;
    let grid_velocity = &ctx.nodes.velocity;

    for material in &mut ctx.materials {
        let id = material.id();
        let particles = &mut material.particles;
        let basis = &particles.basis;
        for_each(parallel, &mut particles.intermediate_velocity, |p, u_star| {
            let u: Vector = basis[p]
                .iter()
                .map(|(node, phi, _)| grid_velocity[node.index()] * phi)
                .sum();
            *u_star = site.vector(u, Site::particle_entity(id, p), "intermediate velocity")?;
            Ok(())
        })?;
    }

    ctx.complete(Stage::VelocityToMaterial);
    Ok(())
}

/// Interpolates grid acceleration to the particles: `a_p = Σ_i φ_i a_i`.
pub fn interpolate_acceleration_to_material(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(Stage::AccelerationToMaterial, &[Stage::GridAcceleration])?;
    let site = Site::new(Stage::AccelerationToMaterial, ctx.current_step());
    let parallel = ctx.config().parallel;
    let grid_acceleration = &ctx.nodes.acceleration;

    for material in &mut ctx.materials {
        let id = material.id();
        let particles = &mut material.particles;
        let basis = &particles.basis;
        for_each(parallel, &mut particles.acceleration, |p, a_p| {
            let a: Vector = basis[p]
                .iter()
                .map(|(node, phi, _)| grid_acceleration[node.index()] * phi)
                .sum();
            *a_p = site.vector(a, Site::particle_entity(id, p), "acceleration")?;
            Ok(())
        })?;
    }

    ctx.complete(Stage::AccelerationToMaterial);
    Ok(())
}

/// Particle velocity gradient `∇u_p = Σ_i u_i ⊗ ∇φ_i(x_p)`.
pub fn calculate_material_velocity_gradient(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(Stage::VelocityGradient, &[Stage::FormulateBasis, Stage::VelocityToGrid])?;
    let site = Site::new(Stage::VelocityGradient, ctx.current_step());
    let parallel = ctx.config().parallel;
    let dimension = ctx.dimension();
    let grid_velocity = &ctx.nodes.velocity;

    for material in &mut ctx.materials {
        let id = material.id();
        let particles = &mut material.particles;
        let basis = &particles.basis;
        for_each(parallel, &mut particles.velocity_gradient, |p, grad_u| {
            let mut g = Tensor::ZERO;
            for (node, _, grad_phi) in basis[p].iter() {
                g += outer(grid_velocity[node.index()], grad_phi);
            }
            *grad_u = site.tensor(
                restrict_tensor(g, dimension),
                Site::particle_entity(id, p),
                "velocity gradient",
            )?;
            Ok(())
        })?;
    }

    ctx.complete(Stage::VelocityGradient);
    Ok(())
}

/// Moves particles: `u_p += a_p Δt`, `x_p += u*_p Δt`.
pub fn advect_material_particles(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(
        Stage::Advection,
        &[Stage::AccelerationToMaterial, Stage::VelocityToMaterial],
    )?;
    let site = Site::new(Stage::Advection, ctx.current_step());
    let parallel = ctx.config().parallel;
    let dt = ctx.dt();

    for material in &mut ctx.materials {
        let id = material.id();
        let particles = &mut material.particles;
        let acceleration = &particles.acceleration;
        let u_star = &particles.intermediate_velocity;
        for_each_pair(
            parallel,
            &mut particles.velocity,
            &mut particles.position,
            |p, u, x| {
                let entity = Site::particle_entity(id, p);
                *u = site.vector(*u + acceleration[p] * dt, entity, "velocity")?;
                *x = site.vector(*x + u_star[p] * dt, entity, "position")?;
                Ok(())
            },
        )?;
    }

    ctx.complete(Stage::Advection);
    Ok(())
}
