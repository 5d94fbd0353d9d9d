//! CLI command implementations.

use std::path::{Path, PathBuf};

use strata_bench::metrics::BenchmarkMetrics;
use strata_bench::runner::BenchmarkRunner;
use strata_bench::scenarios::{Scenario, ScenarioKind};
use strata_debug::{NullSnapshotSink, SnapshotSink};
use strata_io::{
    build_context, build_grid, read_snapshot, validate_input, SimulationInput, SimulationReport,
    SnapshotWriter,
};
use strata_material::MaterialLibrary;
use strata_solver::Integrator;
use strata_telemetry::{EventBus, TracingSink, VecSink};

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Options of the `simulate` command.
pub struct SimulateOptions {
    pub input: PathBuf,
    pub material: Option<String>,
    pub snapshots: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub events: Option<PathBuf>,
    pub parallel: bool,
}

/// Run a simulation from an input file.
pub fn simulate(options: &SimulateOptions) -> CliResult {
    println!("Strata Simulation");
    println!("─────────────────");
    println!("Input: {}", options.input.display());

    let library = MaterialLibrary::with_defaults();
    let mut input = SimulationInput::load(&options.input)?;
    if let Some(name) = &options.material {
        if library.get(name).is_none() {
            return Err(format!(
                "Unknown material: '{name}'. Available: {}",
                library.names().join(", ")
            )
            .into());
        }
        println!("Material override: {name}");
        for material in &mut input.materials {
            material.preset = Some(name.clone());
            material.properties = None;
        }
    }
    if options.parallel {
        input.solver.parallel = true;
    }

    let grid = build_grid(&input)?;
    let ctx = build_context(&input, &grid, &library)?;
    println!(
        "Scene: {} materials, {} particles, {} nodes, {} steps of dt = {}",
        ctx.materials.len(),
        ctx.particle_count(),
        ctx.nodes.node_count,
        input.solver.step_count(),
        input.solver.dt,
    );
    println!();

    let event_sink = VecSink::new();
    let event_log = event_sink.log();
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::default()));
    if options.events.is_some() {
        bus.add_sink(Box::new(event_sink));
    }
    let mut integrator = Integrator::new(ctx).with_bus(bus);

    let mut sink: Box<dyn SnapshotSink> = match &options.snapshots {
        Some(dir) => Box::new(SnapshotWriter::new(dir, 8)?),
        None => Box::new(NullSnapshotSink),
    };
    let summary = integrator.run(sink.as_mut())?;

    println!("  Steps:         {}", summary.steps);
    println!("  Sim time:      {:.4}s", summary.sim_time);
    println!("  Wall time:     {:.3}s", summary.wall_time);
    println!("  Avg step:      {:.3}ms", summary.mean_step_time * 1000.0);
    println!("  Final KE:      {:.6e}", summary.final_kinetic_energy);

    let report = SimulationReport::new(&summary, integrator.context());
    for m in &report.materials {
        println!(
            "  {:<12} {:>7} particles  volume {:.6}  max |σ| {:.4e}",
            m.name, m.particles, m.volume, m.max_stress
        );
    }

    if let Some(path) = &options.report {
        std::fs::write(path, report.to_json()?)?;
        println!("Report written to: {}", path.display());
    }
    if let Some(path) = &options.events {
        let events = event_log
            .lock()
            .map_err(|_| "event log lock poisoned")?;
        std::fs::write(path, serde_json::to_string_pretty(&*events)?)?;
        println!("{} events written to: {}", events.len(), path.display());
    }
    if let Some(dir) = &options.snapshots {
        println!("Snapshots written to: {}", dir.display());
    }
    Ok(())
}

/// Run the benchmark suite.
pub fn benchmark(
    scenario_name: &str,
    steps: Option<u64>,
    parallel: bool,
    output_path: Option<&Path>,
    json_path: Option<&Path>,
) -> CliResult {
    println!("Strata Benchmark Suite");
    println!("══════════════════════");
    println!();

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        let kind = ScenarioKind::from_name(scenario_name).ok_or_else(|| {
            let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
            format!(
                "Unknown scenario: '{scenario_name}'. Available: {}, all",
                available.join(", ")
            )
        })?;
        vec![kind]
    };

    let mut all_metrics = Vec::new();
    for &kind in &scenarios {
        let mut scenario = Scenario::from_kind(kind).with_parallel(parallel);
        if let Some(steps) = steps {
            scenario = scenario.with_steps(steps);
        }
        println!("Running: {} ({} steps)", kind.name(), scenario.steps);

        let metrics =
            BenchmarkRunner::run(&scenario).map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Particles:     {}", metrics.particle_count);
        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg step:      {:.3}ms", metrics.avg_step_time * 1000.0);
        println!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
        println!("  Max displace:  {:.4}", metrics.max_displacement);
        println!("  Mass error:    {:.3e}", metrics.max_mass_error);
        println!();

        all_metrics.push(metrics);
    }

    let csv = BenchmarkMetrics::to_csv(&all_metrics);
    if let Some(path) = output_path {
        std::fs::write(path, &csv)?;
        println!("Results written to: {}", path.display());
    } else {
        println!("CSV Output:");
        println!("{csv}");
    }
    if let Some(path) = json_path {
        std::fs::write(path, BenchmarkMetrics::to_json(&all_metrics)?)?;
        println!("JSON written to: {}", path.display());
    }

    Ok(())
}

/// Inspect a grid snapshot.
pub fn inspect(path: &Path) -> CliResult {
    println!("Strata Snapshot Inspector");
    println!("─────────────────────────");
    println!();

    let snapshot = read_snapshot(path).map_err(|e| format!("Failed to read snapshot: {e}"))?;

    println!("Step:         {}", snapshot.step);
    println!("Sim time:     {:.4}s", snapshot.sim_time);
    println!("Dimension:    {}", snapshot.dimension);
    println!("Nodes:        {}", snapshot.node_count());
    println!("Total mass:   {:.6}", snapshot.total_mass());
    println!("Max speed:    {:.6}", snapshot.max_speed());

    let massive = snapshot.mass.iter().filter(|&&m| m > 0.0).count();
    println!("Nodes w/mass: {massive}");

    Ok(())
}

/// Validate a simulation input.
pub fn validate(path: &Path) -> CliResult {
    println!("Strata Validator");
    println!("────────────────");
    println!();

    let input = SimulationInput::load(path)?;
    validate_input(&input)?;
    let grid = build_grid(&input)?;
    let ctx = build_context(&input, &grid, &MaterialLibrary::with_defaults())?;
    println!(
        "✅ Input is valid ({} materials, {} particles, {} nodes).",
        ctx.materials.len(),
        ctx.particle_count(),
        ctx.nodes.node_count
    );
    Ok(())
}

/// List built-in material presets.
pub fn materials() -> CliResult {
    let library = MaterialLibrary::with_defaults();
    println!("{:<14} {:<15} {:>12} {:>6} {:>9}", "name", "model", "E [Pa]", "ν", "ρ");
    for name in library.names() {
        if let Some(props) = library.get(name) {
            println!(
                "{:<14} {:<15} {:>12.3e} {:>6.3} {:>9.1}",
                props.name,
                format!("{:?}", props.kind),
                props.youngs_modulus,
                props.poisson_ratio,
                props.density
            );
        }
    }
    Ok(())
}
