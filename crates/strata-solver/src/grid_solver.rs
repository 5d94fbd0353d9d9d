//! Explicit momentum solve on the grid with a lumped (diagonal) mass.

use strata_math::{restrict, Vector};
use strata_types::{Stage, StrataResult};
use tracing::debug;

use crate::checks::Site;
use crate::context::SimulationContext;
use crate::parallel::scatter;

/// Resets and accumulates `f_int_i = −Σ_p σ_p ∇φ_i(x_p) V_p`.
pub fn calculate_grid_internal_forces(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(Stage::InternalForces, &[Stage::FormulateBasis])?;
    ctx.require_initialized(Stage::InternalForces)?;
    let site = Site::new(Stage::InternalForces, ctx.current_step());
    let parallel = ctx.config().parallel;
    let dimension = ctx.dimension();
    let n = ctx.nodes.node_count;

    ctx.nodes.internal_force.fill(Vector::ZERO);
    for material in &ctx.materials {
        let particles = &material.particles;
        let forces = scatter(parallel, particles.count, n, |p, buffer: &mut [Vector]| {
            let sigma = particles.stress[p];
            let volume = particles.volume[p];
            for (node, _, grad_phi) in particles.basis[p].iter() {
                buffer[node.index()] -= sigma * grad_phi * volume;
            }
        });
        for (total, f) in ctx.nodes.internal_force.iter_mut().zip(forces) {
            *total += restrict(f, dimension);
        }
    }

    site.nodal_vectors(&ctx.nodes.internal_force, "internal force")?;
    ctx.complete(Stage::InternalForces);
    Ok(())
}

/// `a_i = (f_int_i + f_ext_i) / max(m_i, ε)`.
///
/// Returns the number of nodes that carry mass below the floor.
pub fn calculate_grid_acceleration(ctx: &mut SimulationContext<'_>) -> StrataResult<usize> {
    ctx.require(
        Stage::GridAcceleration,
        &[Stage::MassToGrid, Stage::InternalForces],
    )?;
    let site = Site::new(Stage::GridAcceleration, ctx.current_step());
    let floor = ctx.config().mass_floor;
    let dimension = ctx.dimension();

    let nodes = &mut ctx.nodes;
    let mut floored = 0;
    for i in 0..nodes.node_count {
        let m = nodes.mass[i];
        if m > 0.0 && m < floor {
            floored += 1;
        }
        let force = nodes.internal_force[i] + nodes.external_force[i];
        nodes.acceleration[i] = restrict(force / m.max(floor), dimension);
    }
    site.nodal_vectors(&nodes.acceleration, "grid acceleration")?;

    if floored > 0 {
        debug!(floored, "grid mass floored during acceleration");
    }
    ctx.complete(Stage::GridAcceleration);
    Ok(floored)
}

/// Forward Euler: `u_i ← u_i + a_i Δt`.
pub fn update_grid_velocity(ctx: &mut SimulationContext<'_>) -> StrataResult<()> {
    ctx.require(
        Stage::GridVelocity,
        &[Stage::VelocityToGrid, Stage::GridAcceleration],
    )?;
    let site = Site::new(Stage::GridVelocity, ctx.current_step());
    let dt = ctx.dt();

    let nodes = &mut ctx.nodes;
    for (u, a) in nodes.velocity.iter_mut().zip(&nodes.acceleration) {
        *u += *a * dt;
    }
    site.nodal_vectors(&nodes.velocity, "grid velocity")?;

    ctx.complete(Stage::GridVelocity);
    Ok(())
}
