//! Integration tests for the time integrator and end-to-end scenarios.

use std::sync::{Arc, Mutex};

use strata_debug::{InspectionHook, NullSnapshotSink, VecSnapshotSink};
use strata_grid::generators::{lattice_volume, sample_box, sample_disk, unit_square};
use strata_grid::{GridSpace, RectilinearGrid};
use strata_material::{ConstitutiveModel, Impenetrable, LinearElastic};
use strata_math::{Tensor, Vector};
use strata_solver::{
    constitutive, diagnostics, transfer, DeformationUpdate, Integrator, Material, ParticleState,
    Phase, SimulationContext, SolverConfig,
};
use strata_telemetry::{EventBus, EventKind, VecSink};
use strata_types::{Dimension, Entity, MaterialId, NodeId, ParticleId, Stage, StrataError};

fn elastic() -> Box<dyn ConstitutiveModel> {
    Box::new(LinearElastic::new(1000.0, 0.3).unwrap())
}

fn config(dt: f64) -> SolverConfig {
    SolverConfig {
        dt,
        t_end: 10.0,
        ..Default::default()
    }
}

fn disk(center: Vector, radius: f64, spacing: f64, velocity: Vector) -> ParticleState {
    let points = sample_disk(center, radius, spacing, Dimension::Two);
    let mass = 1000.0 * lattice_volume(spacing, Dimension::Two);
    ParticleState::uniform(points, velocity, mass).unwrap()
}

fn colliding_disks<'g>(grid: &'g RectilinearGrid, config: SolverConfig) -> SimulationContext<'g> {
    let mut ctx = SimulationContext::new(grid, config).unwrap();
    ctx.add_material(Material::new(
        "left",
        elastic(),
        disk(Vector::new(0.3, 0.5, 0.0), 0.15, 0.025, Vector::new(0.1, 0.0, 0.0)),
    ))
    .unwrap();
    ctx.add_material(Material::new(
        "right",
        elastic(),
        disk(Vector::new(0.7, 0.5, 0.0), 0.15, 0.025, Vector::new(-0.1, 0.0, 0.0)),
    ))
    .unwrap();
    ctx
}

fn max_abs_diff(a: &Tensor, b: &Tensor) -> f64 {
    (*a - *b)
        .to_cols_array()
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

/// Overwrites nodal velocities with a prescribed field `u(x)`.
fn prescribe_velocity(ctx: &mut SimulationContext<'_>, field: impl Fn(Vector) -> Vector) {
    let space = ctx.space();
    for i in 0..ctx.nodes.node_count {
        ctx.nodes.velocity[i] = field(space.node_position(NodeId::from(i)));
    }
}

/// Drives `updates + 1` strain increments under a prescribed velocity field.
fn drive_velocity(ctx: &mut SimulationContext<'_>, field: impl Fn(Vector) -> Vector + Copy, updates: u64) {
    ctx.begin_step(0);
    transfer::formulate_basis_functions(ctx).unwrap();
    transfer::interpolate_mass_to_grid(ctx).unwrap();
    transfer::interpolate_velocity_to_grid(ctx).unwrap();
    prescribe_velocity(ctx, field);
    transfer::calculate_material_velocity_gradient(ctx).unwrap();
    constitutive::initialize_material_tensors(ctx).unwrap();
    constitutive::calculate_grid_volume(ctx).unwrap();
    constitutive::calculate_material_density(ctx).unwrap();
    constitutive::calculate_material_initial_volume(ctx).unwrap();

    for step in 1..=updates {
        ctx.begin_step(step);
        transfer::formulate_basis_functions(ctx).unwrap();
        transfer::interpolate_mass_to_grid(ctx).unwrap();
        transfer::interpolate_velocity_to_grid(ctx).unwrap();
        prescribe_velocity(ctx, field);
        transfer::calculate_material_velocity_gradient(ctx).unwrap();
        constitutive::update_material_deformation_gradient(ctx).unwrap();
        constitutive::update_material_volume(ctx).unwrap();
        constitutive::update_material_stress(ctx).unwrap();
    }
}

/// Uniaxial stretch `u = (rate · x, 0, 0)`.
fn drive_stretch(ctx: &mut SimulationContext<'_>, rate: f64, updates: u64) {
    drive_velocity(ctx, move |x| Vector::new(rate * x.x, 0.0, 0.0), updates);
}

fn bar_context(grid: &RectilinearGrid, cfg: SolverConfig) -> SimulationContext<'_> {
    let points = sample_box(
        Vector::new(0.25, 0.25, 0.0),
        Vector::new(0.75, 0.75, 0.0),
        0.125,
        Dimension::Two,
    );
    let mut ctx = SimulationContext::new(grid, cfg).unwrap();
    let particles = ParticleState::uniform(points, Vector::ZERO, 15.625).unwrap();
    ctx.add_material(Material::new("bar", elastic(), particles)).unwrap();
    ctx
}

/// Two coincident rigid particles whose opposing velocities cancel on the
/// grid, so a large body force overflows the faster particle at advection.
fn overflowing_pair(grid: &RectilinearGrid) -> SimulationContext<'_> {
    let mut ctx = SimulationContext::new(grid, config(0.01)).unwrap();
    let center = Vector::new(0.5, 0.5, 0.0);
    let mut particles = ParticleState::at_rest(vec![center, center], vec![1.0, 1.0]).unwrap();
    particles.velocity[0] = Vector::new(f64::MAX, 0.0, 0.0);
    particles.velocity[1] = Vector::new(-f64::MAX, 0.0, 0.0);
    ctx.add_material(Material::new("rigid", Box::new(Impenetrable), particles))
        .unwrap();
    ctx.nodes.fill_external_force(Vector::new(1e307, 0.0, 0.0));
    ctx
}

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn single_particle_at_rest_stays_put() {
    let grid = unit_square(1).unwrap();
    let mut ctx = SimulationContext::new(&grid, config(0.01)).unwrap();
    let particles = ParticleState::at_rest(vec![Vector::new(0.5, 0.5, 0.0)], vec![1.0]).unwrap();
    ctx.add_material(Material::new("disk", elastic(), particles)).unwrap();

    let mut integrator = Integrator::new(ctx);
    let mut sink = VecSnapshotSink::new();
    for _ in 0..10 {
        integrator.step(&mut sink).unwrap();
    }

    let p = &integrator.context().materials[0].particles;
    assert_eq!(p.position[0], Vector::new(0.5, 0.5, 0.0));
    assert_eq!(p.velocity[0], Vector::ZERO);
    assert_eq!(p.deformation_gradient[0], Tensor::IDENTITY);
    assert_eq!(p.stress[0], Tensor::ZERO);
    assert!((p.volume[0] - p.initial_volume[0]).abs() < 1e-14);

    assert_eq!(sink.snapshots.len(), 10);
    let last = sink.last().unwrap();
    for &m in &last.mass {
        assert!((m - 0.25).abs() < 1e-12);
    }
    assert_eq!(last.max_speed(), 0.0);
}

#[test]
fn uniaxial_stretch_matches_hooke() {
    let grid = unit_square(4).unwrap();
    let mut ctx = bar_context(&grid, config(0.01));

    let rate = 0.5;
    let updates = 4;
    drive_stretch(&mut ctx, rate, updates);

    // Strain accumulates once at initialization and once per update.
    let eps = (updates + 1) as f64 * 0.01 * rate;
    let lambda = 1000.0 * 0.3 / (1.3 * 0.4);
    let mu = 1000.0 / 2.6;
    let expected = Tensor::from_diagonal(Vector::new((lambda + 2.0 * mu) * eps, lambda * eps, 0.0));
    let stretch = (1.0 + 0.01 * rate).powi(updates as i32 + 1);

    let p = &ctx.materials[0].particles;
    for i in 0..p.count {
        assert!((p.strain[i].x_axis.x - eps).abs() < 1e-12);
        assert!(max_abs_diff(&p.stress[i], &expected) < 1e-9);
        assert!((p.deformation_gradient[i].x_axis.x - stretch).abs() < 1e-12);
        assert!((p.volume[i] - stretch * p.initial_volume[i]).abs() < 1e-12);
    }
}

#[test]
fn hadamard_matches_multiplicative_for_diagonal_gradient() {
    let grid = unit_square(4).unwrap();
    let mut results = Vec::new();
    for rule in [DeformationUpdate::Multiplicative, DeformationUpdate::Hadamard] {
        let cfg = SolverConfig {
            deformation_update: rule,
            ..config(0.01)
        };
        let mut ctx = bar_context(&grid, cfg);
        drive_stretch(&mut ctx, -0.8, 6);
        results.push(ctx.materials[0].particles.deformation_gradient.clone());
    }

    for (a, b) in results[0].iter().zip(&results[1]) {
        assert!(max_abs_diff(a, b) < 1e-12);
    }
}

#[test]
fn hadamard_differs_from_multiplicative_under_shear() {
    let grid = unit_square(4).unwrap();
    let (dt, gamma, updates) = (0.01, 0.5, 3_u64);
    let shear = move |x: Vector| Vector::new(gamma * x.y, 0.0, 0.0);

    let mut shear_terms = Vec::new();
    for rule in [DeformationUpdate::Multiplicative, DeformationUpdate::Hadamard] {
        let cfg = SolverConfig {
            deformation_update: rule,
            ..config(dt)
        };
        let mut ctx = bar_context(&grid, cfg);
        drive_velocity(&mut ctx, shear, updates);
        let p = &ctx.materials[0].particles;
        // (∇u)_jk = ∂u_j/∂x_k: only ∂u_x/∂y is nonzero.
        assert!((p.velocity_gradient[0].y_axis.x - gamma).abs() < 1e-12);
        assert!(p.velocity_gradient[0].x_axis.y.abs() < 1e-12);
        for f in &p.deformation_gradient {
            assert!((f.x_axis.x - 1.0).abs() < 1e-12);
            assert!((f.y_axis.y - 1.0).abs() < 1e-12);
        }
        shear_terms.push(p.deformation_gradient[0].y_axis.x);
    }

    let step = dt * gamma;
    // dF·F accumulates the shear; dF∘F multiplies it.
    assert!((shear_terms[0] - (updates + 1) as f64 * step).abs() < 1e-12);
    assert!((shear_terms[1] - step.powi(updates as i32 + 1)).abs() < 1e-15);
    assert!((shear_terms[0] - shear_terms[1]).abs() > 1e-3);
}

#[test]
fn first_step_volume_includes_initial_increment() {
    let grid = unit_square(4).unwrap();
    let mut ctx = bar_context(&grid, config(0.01));
    let rate = 0.5;
    drive_stretch(&mut ctx, rate, 0);

    let p = &ctx.materials[0].particles;
    for i in 0..p.count {
        assert!((p.initial_volume[i] - p.mass[i] / p.density[i]).abs() < 1e-12);
        let det = p.deformation_gradient[i].determinant();
        assert!((det - (1.0 + 0.01 * rate)).abs() < 1e-12);
        assert!((p.volume[i] - det * p.initial_volume[i]).abs() < 1e-12);
        assert!(p.volume[i] > p.initial_volume[i]);
    }
}

#[test]
fn colliding_disks_conserve_mass_and_volume_identity() {
    let grid = unit_square(10).unwrap();
    let ctx = colliding_disks(&grid, config(0.01));
    let initial_mass = ctx.particle_mass();
    let mut integrator = Integrator::new(ctx);
    let mut sink = NullSnapshotSink;

    for _ in 0..20 {
        let result = integrator.step(&mut sink).unwrap();
        let c = result.conservation;
        assert!(c.mass_error() < 1e-12);
        assert!((c.particle_mass - initial_mass).abs() < 1e-12);
    }

    let ctx = integrator.context();
    assert!(diagnostics::volume_consistency_error(ctx) < 1e-10);
    // Symmetric approach keeps total momentum near zero.
    let momentum: Vector = ctx.materials.iter().map(|m| m.particles.momentum()).sum();
    assert!(momentum.length() < 1e-9);
}

#[test]
fn parallel_run_matches_sequential() {
    let grid = unit_square(10).unwrap();
    let mut finals = Vec::new();
    for parallel in [false, true] {
        let cfg = SolverConfig {
            parallel,
            ..config(0.01)
        };
        let mut integrator = Integrator::new(colliding_disks(&grid, cfg));
        for _ in 0..5 {
            integrator.step(&mut NullSnapshotSink).unwrap();
        }
        let ctx = integrator.into_context();
        let positions: Vec<Vector> = ctx
            .materials
            .iter()
            .flat_map(|m| m.particles.position.iter().copied())
            .collect();
        finals.push(positions);
    }
    assert_eq!(finals[0].len(), finals[1].len());
    for (a, b) in finals[0].iter().zip(&finals[1]) {
        assert!((*a - *b).length() < 1e-12);
    }
}

#[test]
fn material_at_rest_accumulates_nothing() {
    let grid = unit_square(8).unwrap();
    let mut ctx = SimulationContext::new(&grid, config(0.01)).unwrap();
    ctx.add_material(Material::new(
        "block",
        elastic(),
        disk(Vector::new(0.5, 0.5, 0.0), 0.3, 0.05, Vector::ZERO),
    ))
    .unwrap();
    let start = ctx.materials[0].particles.position.clone();
    let mut integrator = Integrator::new(ctx);
    for _ in 0..5 {
        integrator.step(&mut NullSnapshotSink).unwrap();
    }
    let p = &integrator.context().materials[0].particles;
    assert_eq!(p.position, start);
    assert!(p.deformation_gradient.iter().all(|f| *f == Tensor::IDENTITY));
    assert!(p.stress.iter().all(|s| *s == Tensor::ZERO));
    for i in 0..p.count {
        assert_eq!(p.volume[i], p.initial_volume[i]);
    }
}

// ─── Lifecycle Tests ──────────────────────────────────────────

#[test]
fn phases_advance_through_lifecycle() {
    let grid = unit_square(2).unwrap();
    let cfg = SolverConfig {
        t_end: 0.02,
        ..config(0.01)
    };
    let mut ctx = SimulationContext::new(&grid, cfg.clone()).unwrap();
    ctx.add_material(Material::new(
        "a",
        elastic(),
        ParticleState::at_rest(vec![Vector::new(0.4, 0.6, 0.0)], vec![1.0]).unwrap(),
    ))
    .unwrap();
    let mut integrator = Integrator::new(ctx);
    assert_eq!(integrator.phase(), Phase::Uninitialized);

    let first = integrator.step(&mut NullSnapshotSink).unwrap();
    assert_eq!(first.step, 0);
    assert_eq!(first.phase, Phase::Stepping);
    assert!(integrator.context().is_initialized());

    let summary = integrator.run(&mut NullSnapshotSink).unwrap();
    assert_eq!(integrator.phase(), Phase::Terminated);
    assert_eq!(integrator.steps(), cfg.step_count());
    assert_eq!(summary.steps, cfg.step_count() - 1);
    assert!(summary.sim_time > cfg.t_end);
    assert!(!summary.stopped);
    assert!(matches!(
        integrator.step(&mut NullSnapshotSink),
        Err(StrataError::Terminated)
    ));
}

#[test]
fn stop_request_ends_run_early() {
    let grid = unit_square(2).unwrap();
    let mut ctx = SimulationContext::new(&grid, config(0.01)).unwrap();
    ctx.add_material(Material::new(
        "a",
        elastic(),
        ParticleState::at_rest(vec![Vector::new(0.5, 0.5, 0.0)], vec![1.0]).unwrap(),
    ))
    .unwrap();
    let mut integrator = Integrator::new(ctx);
    let handle = integrator.stop_handle();
    handle.request_stop();
    assert!(handle.is_stop_requested());

    let summary = integrator.run(&mut NullSnapshotSink).unwrap();
    assert!(summary.stopped);
    assert_eq!(summary.steps, 0);
    assert_eq!(integrator.phase(), Phase::Terminated);
}

#[test]
fn particle_leaving_domain_halts_with_rollback() {
    let grid = unit_square(2).unwrap();
    let mut ctx = SimulationContext::new(&grid, config(0.01)).unwrap();
    let particles =
        ParticleState::uniform(vec![Vector::new(0.95, 0.5, 0.0)], Vector::new(10.0, 0.0, 0.0), 1.0)
            .unwrap();
    ctx.add_material(Material::new("rigid", Box::new(Impenetrable), particles))
        .unwrap();
    let mut integrator = Integrator::new(ctx);

    integrator.step(&mut NullSnapshotSink).unwrap();
    let after_first = integrator.context().materials[0].particles.position[0];
    assert!(after_first.x > 1.0);

    match integrator.step(&mut NullSnapshotSink) {
        Err(StrataError::OutOfDomainParticle { step, .. }) => assert_eq!(step, 1),
        other => panic!("expected out-of-domain error, got {other:?}"),
    }
    assert_eq!(integrator.phase(), Phase::Terminated);
    assert!(integrator.halt_reason().unwrap().starts_with("Out-of-domain"));
    assert_eq!(integrator.steps(), 1);
    // Rolled back to the start of the failed step.
    assert_eq!(integrator.context().materials[0].particles.position[0], after_first);
    assert!(matches!(
        integrator.step(&mut NullSnapshotSink),
        Err(StrataError::Terminated)
    ));
}

#[test]
fn divergence_halts_with_rollback_and_no_snapshot() {
    let grid = unit_square(1).unwrap();
    let ctx = overflowing_pair(&grid);
    let particles = ctx.materials[0].particles.clone();
    let nodes = ctx.nodes.clone();

    let mut integrator = Integrator::new(ctx);
    let mut sink = VecSnapshotSink::new();
    match integrator.step(&mut sink) {
        Err(StrataError::NumericalDivergence {
            stage,
            step,
            entity,
            field,
        }) => {
            assert_eq!(stage, Stage::Advection);
            assert_eq!(step, 0);
            assert_eq!(
                entity,
                Entity::Particle {
                    material: MaterialId::from(0),
                    particle: ParticleId::from(0),
                }
            );
            assert_eq!(field, "velocity");
        }
        other => panic!("expected numerical divergence, got {other:?}"),
    }

    assert!(sink.snapshots.is_empty());
    assert_eq!(integrator.phase(), Phase::Terminated);
    assert_eq!(integrator.steps(), 0);
    assert!(integrator.halt_reason().is_some());

    let ctx = integrator.context();
    assert!(!ctx.is_initialized());
    let p = &ctx.materials[0].particles;
    assert_eq!(p.position, particles.position);
    assert_eq!(p.velocity, particles.velocity);
    assert_eq!(p.deformation_gradient, particles.deformation_gradient);
    assert_eq!(p.volume, particles.volume);
    assert_eq!(p.density, particles.density);
    assert_eq!(ctx.nodes.mass, nodes.mass);
    assert_eq!(ctx.nodes.velocity, nodes.velocity);
    assert_eq!(ctx.nodes.acceleration, nodes.acceleration);
    assert_eq!(ctx.nodes.external_force, nodes.external_force);
}

#[test]
fn snapshots_follow_completed_steps() {
    let grid = unit_square(2).unwrap();
    let mut ctx = SimulationContext::new(&grid, config(0.01)).unwrap();
    let particles =
        ParticleState::uniform(vec![Vector::new(0.95, 0.5, 0.0)], Vector::new(10.0, 0.0, 0.0), 1.0)
            .unwrap();
    ctx.add_material(Material::new("rigid", Box::new(Impenetrable), particles))
        .unwrap();
    let mut integrator = Integrator::new(ctx);
    let mut sink = VecSnapshotSink::new();

    integrator.step(&mut sink).unwrap();
    assert!(integrator.step(&mut sink).is_err());
    assert_eq!(sink.snapshots.len(), 1);
    assert_eq!(sink.snapshots[0].step, 0);
}

// ─── Observation Tests ────────────────────────────────────────

struct RecordingHook {
    log: Arc<Mutex<Vec<String>>>,
}

impl InspectionHook for RecordingHook {
    fn on_step_begin(&mut self, step: u64, _sim_time: f64) {
        self.log.lock().unwrap().push(format!("begin {step}"));
    }
    fn on_stage(&mut self, _step: u64, stage: Stage) {
        if stage == Stage::InitialVolume {
            self.log.lock().unwrap().push("initialized".into());
        }
    }
    fn on_step_end(&mut self, step: u64, _wall_time: f64) {
        self.log.lock().unwrap().push(format!("end {step}"));
    }
    fn on_simulation_end(&mut self) {
        self.log.lock().unwrap().push("done".into());
    }
    fn name(&self) -> &str {
        "recording"
    }
}

#[test]
fn hooks_observe_steps_in_order() {
    let grid = unit_square(2).unwrap();
    let cfg = SolverConfig {
        t_end: 0.015,
        ..config(0.01)
    };
    let mut ctx = SimulationContext::new(&grid, cfg).unwrap();
    ctx.add_material(Material::new(
        "a",
        elastic(),
        ParticleState::at_rest(vec![Vector::new(0.5, 0.5, 0.0)], vec![1.0]).unwrap(),
    ))
    .unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut integrator = Integrator::new(ctx);
    integrator.add_hook(Box::new(RecordingHook { log: log.clone() }));
    integrator.run(&mut NullSnapshotSink).unwrap();

    let log = log.lock().unwrap();
    assert_eq!(
        *log,
        ["begin 0", "initialized", "end 0", "begin 1", "end 1", "done"]
    );
}

#[test]
fn bus_receives_step_events() {
    let grid = unit_square(2).unwrap();
    let mut ctx = SimulationContext::new(&grid, config(0.01)).unwrap();
    ctx.add_material(Material::new(
        "a",
        elastic(),
        ParticleState::at_rest(vec![Vector::new(0.5, 0.5, 0.0)], vec![1.0]).unwrap(),
    ))
    .unwrap();
    let sink = VecSink::new();
    let log = sink.log();
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(sink));
    let mut integrator = Integrator::new(ctx).with_bus(bus);

    integrator.step(&mut NullSnapshotSink).unwrap();
    integrator.step(&mut NullSnapshotSink).unwrap();

    let events = log.lock().unwrap();
    let initialized = events
        .iter()
        .filter(|e| matches!(e.kind, EventKind::Initialized { .. }))
        .count();
    assert_eq!(initialized, 1);
    assert!(events
        .iter()
        .any(|e| e.step == 1 && matches!(e.kind, EventKind::StepEnd { .. })));
    for e in events.iter() {
        if let EventKind::Conservation {
            particle_mass,
            grid_mass,
        } = e.kind
        {
            assert!((particle_mass - grid_mass).abs() < 1e-12);
        }
    }
}
