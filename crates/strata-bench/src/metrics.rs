//! Benchmark metrics: data collected during a benchmark run.

use serde::{Deserialize, Serialize};
use strata_types::{StrataError, StrataResult};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    pub scenario: String,
    pub particle_count: usize,
    pub node_count: usize,
    pub steps: u64,
    pub parallel: bool,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    pub avg_step_time: f64,
    pub min_step_time: f64,
    pub max_step_time: f64,
    pub initial_kinetic_energy: f64,
    pub final_kinetic_energy: f64,
    /// Largest relative particle/grid mass mismatch over all steps.
    pub max_mass_error: f64,
    /// Largest particle displacement from its initial position.
    pub max_displacement: f64,
    /// Most nodes floored in any single step.
    pub max_floored_nodes: usize,
    /// Largest `|V − det(F) V0| / V0` at the end of the run.
    pub volume_consistency_error: f64,
}

impl BenchmarkMetrics {
    /// CSV header row.
    pub fn to_csv_header() -> String {
        "scenario,particles,nodes,steps,parallel,total_wall_time_s,avg_step_ms,min_step_ms,max_step_ms,initial_ke,final_ke,max_mass_error,max_displacement,max_floored_nodes,volume_error".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.6e},{:.6e},{:.3e},{:.6},{},{:.3e}",
            self.scenario,
            self.particle_count,
            self.node_count,
            self.steps,
            self.parallel,
            self.total_wall_time,
            self.avg_step_time * 1000.0,
            self.min_step_time * 1000.0,
            self.max_step_time * 1000.0,
            self.initial_kinetic_energy,
            self.final_kinetic_energy,
            self.max_mass_error,
            self.max_displacement,
            self.max_floored_nodes,
            self.volume_consistency_error,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }

    /// Pretty JSON array of metrics.
    pub fn to_json(metrics: &[BenchmarkMetrics]) -> StrataResult<String> {
        serde_json::to_string_pretty(metrics).map_err(|e| StrataError::Serialization(e.to_string()))
    }
}
