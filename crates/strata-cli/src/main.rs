//! Strata CLI: simulation, benchmarking, and inspection.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;

#[derive(Parser)]
#[command(name = "strata")]
#[command(version, about = "Strata: explicit Material Point Method engine")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from an input file.
    Simulate {
        /// Simulation input (TOML, or JSON by extension).
        #[arg(short, long, default_value = "simulation.toml")]
        input: PathBuf,

        /// Replace every material's properties with this preset.
        #[arg(short, long)]
        material: Option<String>,

        /// Directory for per-step grid snapshots.
        #[arg(long)]
        snapshots: Option<PathBuf>,

        /// Write the run report as JSON.
        #[arg(long)]
        report: Option<PathBuf>,

        /// Write the simulation event log as JSON.
        #[arg(long)]
        events: Option<PathBuf>,

        /// Use the rayon-backed stages.
        #[arg(long)]
        parallel: bool,
    },

    /// Run the benchmark suite.
    Benchmark {
        /// Scenario to run (particle_at_rest, colliding_disks, block_impact, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Override the step budget of each scenario.
        #[arg(long)]
        steps: Option<u64>,

        /// Use the rayon-backed stages.
        #[arg(long)]
        parallel: bool,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output JSON file path.
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Inspect a grid snapshot file.
    Inspect {
        /// Path to snapshot file.
        path: PathBuf,
    },

    /// Validate a simulation input without running it.
    Validate {
        /// Path to input file.
        path: PathBuf,
    },

    /// List the built-in material presets.
    Materials,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(&cli.log_level))
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: logging unavailable: {e}");
    }

    let result = match cli.command {
        Commands::Simulate {
            input,
            material,
            snapshots,
            report,
            events,
            parallel,
        } => commands::simulate(&commands::SimulateOptions {
            input,
            material,
            snapshots,
            report,
            events,
            parallel,
        }),
        Commands::Benchmark {
            scenario,
            steps,
            parallel,
            output,
            json,
        } => commands::benchmark(&scenario, steps, parallel, output.as_deref(), json.as_deref()),
        Commands::Inspect { path } => commands::inspect(&path),
        Commands::Validate { path } => commands::validate(&path),
        Commands::Materials => commands::materials(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
