//! Integration tests for strata-bench.

use strata_bench::metrics::BenchmarkMetrics;
use strata_bench::runner::BenchmarkRunner;
use strata_bench::scenarios::{Scenario, ScenarioKind};
use strata_io::validate_input;

fn sample_metrics(name: &str) -> BenchmarkMetrics {
    BenchmarkMetrics {
        scenario: name.into(),
        particle_count: 1608,
        node_count: 441,
        steps: 10,
        parallel: false,
        total_wall_time: 1.5,
        avg_step_time: 0.15,
        min_step_time: 0.1,
        max_step_time: 0.2,
        initial_kinetic_energy: 0.5,
        final_kinetic_energy: 0.25,
        max_mass_error: 1e-15,
        max_displacement: 0.01,
        max_floored_nodes: 3,
        volume_consistency_error: 1e-14,
    }
}

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn all_scenarios() {
    assert_eq!(ScenarioKind::all().len(), 3);
    for &kind in ScenarioKind::all() {
        let scenario = Scenario::from_kind(kind);
        assert_eq!(scenario.kind, kind);
        assert_eq!(ScenarioKind::from_name(kind.name()), Some(kind));
        assert!(validate_input(&scenario.input).is_ok(), "{} should be valid", kind.name());
    }
    assert!(ScenarioKind::from_name("sphere_drape").is_none());
}

#[test]
fn resolved_input_ends_after_step_budget() {
    let scenario = Scenario::colliding_disks().with_steps(7);
    let input = scenario.resolved_input();
    assert_eq!(input.solver.step_count(), 7);
    assert_eq!(Scenario::particle_at_rest().with_steps(0).resolved_input().solver.step_count(), 1);
}

// ─── Runner Tests ─────────────────────────────────────────────

#[test]
fn particle_at_rest_does_not_move() {
    let metrics = BenchmarkRunner::run(&Scenario::particle_at_rest()).unwrap();
    assert_eq!(metrics.scenario, "particle_at_rest");
    assert_eq!(metrics.steps, 10);
    assert_eq!(metrics.particle_count, 1);
    assert_eq!(metrics.node_count, 4);
    assert_eq!(metrics.max_displacement, 0.0);
    assert_eq!(metrics.final_kinetic_energy, 0.0);
    assert!(metrics.max_mass_error < 1e-14);
}

#[test]
fn colliding_disks_short_run() {
    let scenario = Scenario::colliding_disks().with_steps(5);
    let metrics = BenchmarkRunner::run(&scenario).unwrap();
    assert_eq!(metrics.steps, 5);
    assert!(metrics.particle_count > 1000);
    assert!(metrics.initial_kinetic_energy > 0.0);
    assert!(metrics.max_displacement > 0.0);
    assert!(metrics.max_mass_error < 1e-12);
    assert!(metrics.volume_consistency_error < 1e-10);
}

#[test]
fn parallel_block_impact_runs() {
    let scenario = Scenario::block_impact().with_steps(3).with_parallel(true);
    let metrics = BenchmarkRunner::run(&scenario).unwrap();
    assert!(metrics.parallel);
    assert_eq!(metrics.steps, 3);
    assert!(metrics.total_wall_time >= 0.0);
    assert!(metrics.min_step_time <= metrics.max_step_time);
}

// ─── Metrics Tests ────────────────────────────────────────────

#[test]
fn metrics_csv_output() {
    let row = sample_metrics("test").to_csv_row();
    assert!(row.starts_with("test,1608,441,10,false"));
    let columns = BenchmarkMetrics::to_csv_header().split(',').count();
    assert_eq!(row.split(',').count(), columns);
}

#[test]
fn metrics_csv_multi() {
    let csv = BenchmarkMetrics::to_csv(&[sample_metrics("a"), sample_metrics("b")]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3); // Header + 2 data rows
    assert!(lines[0].starts_with("scenario"));
}

#[test]
fn metrics_json_round_trip() {
    let json = BenchmarkMetrics::to_json(&[sample_metrics("test")]).unwrap();
    let recovered: Vec<BenchmarkMetrics> = serde_json::from_str(&json).unwrap();
    assert_eq!(recovered[0].steps, 10);
    assert_eq!(recovered[0].max_floored_nodes, 3);
}
