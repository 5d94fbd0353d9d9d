//! Benchmark runner: executes scenarios with the integrator and collects metrics.

use std::time::Instant;

use strata_debug::NullSnapshotSink;
use strata_io::{build_context, build_grid};
use strata_material::MaterialLibrary;
use strata_math::Vector;
use strata_solver::{diagnostics, Integrator, Phase};
use strata_types::StrataResult;
use tracing::info;

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    /// Run a single scenario with the default material library.
    pub fn run(scenario: &Scenario) -> StrataResult<BenchmarkMetrics> {
        Self::run_with_library(scenario, &MaterialLibrary::with_defaults())
    }

    /// Run a single scenario, resolving presets from `library`.
    pub fn run_with_library(
        scenario: &Scenario,
        library: &MaterialLibrary,
    ) -> StrataResult<BenchmarkMetrics> {
        let input = scenario.resolved_input();
        let grid = build_grid(&input)?;
        let ctx = build_context(&input, &grid, library)?;
        let node_count = ctx.nodes.node_count;
        let particle_count = ctx.particle_count();
        let initial_kinetic_energy = diagnostics::kinetic_energy(&ctx);

        // Save initial positions for displacement tracking
        let initial: Vec<Vec<Vector>> = ctx
            .materials
            .iter()
            .map(|m| m.particles.position.clone())
            .collect();

        let mut integrator = Integrator::new(ctx);
        let mut sink = NullSnapshotSink;
        let mut step_times = Vec::with_capacity(scenario.steps as usize);
        let mut max_mass_error: f64 = 0.0;
        let mut max_floored_nodes = 0;

        let total_start = Instant::now();
        while integrator.phase() != Phase::Terminated {
            let result = integrator.step(&mut sink)?;
            step_times.push(result.wall_time);
            max_mass_error = max_mass_error.max(result.conservation.mass_error());
            max_floored_nodes = max_floored_nodes.max(result.floored_nodes);
        }
        let total_wall_time = total_start.elapsed().as_secs_f64();

        let ctx = integrator.context();
        let max_displacement = ctx
            .materials
            .iter()
            .zip(&initial)
            .flat_map(|(m, start)| {
                m.particles
                    .position
                    .iter()
                    .zip(start)
                    .map(|(x, x0)| x.distance(*x0))
            })
            .fold(0.0, f64::max);

        let avg_step = if step_times.is_empty() {
            0.0
        } else {
            step_times.iter().sum::<f64>() / step_times.len() as f64
        };
        let min_step = step_times.iter().copied().fold(f64::MAX, f64::min);
        let max_step = step_times.iter().copied().fold(0.0, f64::max);

        let metrics = BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            particle_count,
            node_count,
            steps: integrator.steps(),
            parallel: input.solver.parallel,
            total_wall_time,
            avg_step_time: avg_step,
            min_step_time: min_step,
            max_step_time: max_step,
            initial_kinetic_energy,
            final_kinetic_energy: diagnostics::kinetic_energy(ctx),
            max_mass_error,
            max_displacement,
            max_floored_nodes,
            volume_consistency_error: diagnostics::volume_consistency_error(ctx),
        };
        info!(
            scenario = %metrics.scenario,
            steps = metrics.steps,
            wall_time = metrics.total_wall_time,
            "benchmark complete"
        );
        Ok(metrics)
    }

    /// Run all scenarios and return metrics for each.
    pub fn run_all(parallel: bool) -> StrataResult<Vec<BenchmarkMetrics>> {
        ScenarioKind::all()
            .iter()
            .map(|&kind| Self::run(&Scenario::from_kind(kind).with_parallel(parallel)))
            .collect()
    }
}
