//! Explicit MPM time integration.
//!
//! The integrator is a small state machine over a [`SimulationContext`]:
//!
//! ```text
//! Uninitialized ──step──▶ Initializing ──(first step ok)──▶ Stepping
//!        │                     │                              │
//!        └─────────────────────┴───── error / t > t_end ──────┴──▶ Terminated
//! ```
//!
//! Each step runs the stage pipeline in a fixed order, emits one grid
//! snapshot once the particles have advanced, and advances time by `Δt`.
//! A failing stage aborts the step without publishing its snapshot,
//! restores the start-of-step checkpoint, and terminates the run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use strata_debug::{GridSnapshot, InspectionHook, SnapshotSink};
use strata_telemetry::{EventBus, EventKind};
use strata_types::{Stage, StrataError, StrataResult};
use tracing::{debug, info, warn};

use crate::context::SimulationContext;
use crate::diagnostics::{self, Conservation};
use crate::{constitutive, grid_solver, transfer};

/// Lifecycle phase of an [`Integrator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No step has run yet.
    Uninitialized,
    /// The first step is running; density and reference volume are computed in it.
    Initializing,
    /// Regular steps.
    Stepping,
    /// Finished or halted; no further steps can run.
    Terminated,
}

/// Cooperative stop request, checked between steps.
///
/// Clones share one flag, so a handle can be moved to another thread
/// (e.g. a Ctrl-C handler) while the integrator runs.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asks the run loop to stop at the next step boundary.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of one completed step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    /// Index of the step that ran.
    pub step: u64,
    /// Simulation time after the step.
    pub sim_time: f64,
    /// Wall-clock time for this step (seconds).
    pub wall_time: f64,
    /// Nodes whose mass was floored in this step.
    pub floored_nodes: usize,
    pub conservation: Conservation,
    /// Phase after the step.
    pub phase: Phase,
}

/// Summary of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Completed steps.
    pub steps: u64,
    /// Simulation time reached.
    pub sim_time: f64,
    /// Total wall-clock time (seconds).
    pub wall_time: f64,
    /// Mean wall-clock time per step (seconds).
    pub mean_step_time: f64,
    /// The run ended because a stop was requested.
    pub stopped: bool,
    pub final_kinetic_energy: f64,
}

/// Drives a simulation context through its steps.
pub struct Integrator<'g> {
    ctx: SimulationContext<'g>,
    phase: Phase,
    steps: u64,
    time: f64,
    halt_reason: Option<String>,
    stop: StopHandle,
    hooks: Vec<Box<dyn InspectionHook>>,
    bus: Option<EventBus>,
}

impl<'g> Integrator<'g> {
    /// Wraps a context. Time starts at `t_start`.
    pub fn new(ctx: SimulationContext<'g>) -> Self {
        let time = ctx.config().t_start;
        Self {
            ctx,
            phase: Phase::Uninitialized,
            steps: 0,
            time,
            halt_reason: None,
            stop: StopHandle::new(),
            hooks: Vec::new(),
            bus: None,
        }
    }

    /// Routes structured events to a telemetry bus.
    pub fn with_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Registers an inspection hook.
    pub fn add_hook(&mut self, hook: Box<dyn InspectionHook>) {
        self.hooks.push(hook);
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn context(&self) -> &SimulationContext<'g> {
        &self.ctx
    }

    /// Mutable context access, e.g. to set external forces between steps.
    pub fn context_mut(&mut self) -> &mut SimulationContext<'g> {
        &mut self.ctx
    }

    pub fn into_context(self) -> SimulationContext<'g> {
        self.ctx
    }

    /// Current simulation time.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Display form of the error that halted the run, if any.
    pub fn halt_reason(&self) -> Option<&str> {
        self.halt_reason.as_deref()
    }

    /// A handle that stops [`run`](Self::run) at the next step boundary.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn bus_mut(&mut self) -> Option<&mut EventBus> {
        self.bus.as_mut()
    }

    fn record(&self, kind: EventKind) {
        if let Some(bus) = &self.bus {
            bus.record(self.steps, kind);
        }
    }

    /// Runs one step.
    ///
    /// On error the step's changes are rolled back (when enabled), the
    /// integrator terminates, and the error is returned. Fails with
    /// `Terminated` if the run is already over.
    pub fn step(&mut self, sink: &mut dyn SnapshotSink) -> StrataResult<StepResult> {
        if self.phase == Phase::Terminated {
            return Err(StrataError::Terminated);
        }
        if self.phase == Phase::Uninitialized {
            self.phase = Phase::Initializing;
            info!(
                particles = self.ctx.particle_count(),
                materials = self.ctx.materials.len(),
                nodes = self.ctx.nodes.node_count,
                "initializing simulation"
            );
        }

        let start = Instant::now();
        let step = self.steps;
        let sim_time = self.time;
        for hook in &mut self.hooks {
            hook.on_step_begin(step, sim_time);
        }
        self.record(EventKind::StepBegin { sim_time });

        let checkpoint = self
            .ctx
            .config()
            .rollback_on_error
            .then(|| self.ctx.checkpoint());

        let floored = match self.advance(sink) {
            Ok(floored) => floored,
            Err(err) => {
                if let Some(checkpoint) = checkpoint {
                    if let Err(restore_err) = self.ctx.restore(checkpoint) {
                        warn!(%restore_err, "rollback failed");
                    }
                }
                let reason = err.to_string();
                warn!(step, %reason, "step failed; simulation halted");
                for hook in &mut self.hooks {
                    hook.on_halt(step, &reason);
                }
                self.record(EventKind::Halted {
                    reason: reason.clone(),
                });
                if let Some(bus) = &mut self.bus {
                    bus.flush();
                }
                self.halt_reason = Some(reason);
                self.phase = Phase::Terminated;
                return Err(err);
            }
        };

        let wall_time = start.elapsed().as_secs_f64();
        let conservation = Conservation::measure(&self.ctx);
        for hook in &mut self.hooks {
            hook.on_step_end(step, wall_time);
        }
        self.record(EventKind::Energy {
            kinetic: conservation.kinetic_energy,
        });
        self.record(EventKind::StepEnd { wall_time });
        if let Some(bus) = &mut self.bus {
            bus.flush();
        }

        self.steps += 1;
        self.time = self.ctx.config().time_after(self.steps);
        if self.time > self.ctx.config().t_end {
            self.phase = Phase::Terminated;
            info!(steps = self.steps, t = self.time, "reached end time");
        }
        debug!(step, t = self.time, wall_time, "step complete");

        Ok(StepResult {
            step,
            sim_time: self.time,
            wall_time,
            floored_nodes: floored,
            conservation,
            phase: self.phase,
        })
    }

    /// Runs steps until the end time, a stop request, or an error.
    ///
    /// The sink is finished and hooks are notified in every case.
    pub fn run(&mut self, sink: &mut dyn SnapshotSink) -> StrataResult<RunSummary> {
        let start = Instant::now();
        let first = self.steps;
        let mut stopped = false;
        let mut outcome = Ok(());

        while self.phase != Phase::Terminated {
            if self.stop.is_stop_requested() {
                info!(steps = self.steps, t = self.time, "stop requested");
                self.phase = Phase::Terminated;
                stopped = true;
                break;
            }
            if let Err(err) = self.step(sink) {
                outcome = Err(err);
                break;
            }
        }

        let finished = sink.finish();
        for hook in &mut self.hooks {
            hook.on_simulation_end();
        }
        if let Some(bus) = &mut self.bus {
            bus.finalize();
        }
        outcome?;
        finished?;

        let steps = self.steps - first;
        let wall_time = start.elapsed().as_secs_f64();
        let summary = RunSummary {
            steps,
            sim_time: self.time,
            wall_time,
            mean_step_time: if steps > 0 { wall_time / steps as f64 } else { 0.0 },
            stopped,
            final_kinetic_energy: diagnostics::kinetic_energy(&self.ctx),
        };
        info!(
            steps = summary.steps,
            t = summary.sim_time,
            wall_time = summary.wall_time,
            "run complete"
        );
        Ok(summary)
    }

    fn stage_done(&mut self, stage: Stage) {
        for hook in &mut self.hooks {
            hook.on_stage(self.steps, stage);
        }
    }

    /// The stage pipeline of one step. Returns the number of floored nodes.
    fn advance(&mut self, sink: &mut dyn SnapshotSink) -> StrataResult<usize> {
        let step = self.steps;
        self.ctx.begin_step(step);

        transfer::formulate_basis_functions(&mut self.ctx)?;
        self.stage_done(Stage::FormulateBasis);
        transfer::interpolate_mass_to_grid(&mut self.ctx)?;
        self.stage_done(Stage::MassToGrid);
        self.record(EventKind::Conservation {
            particle_mass: self.ctx.particle_mass(),
            grid_mass: self.ctx.nodes.total_mass(),
        });
        let mut floored = transfer::interpolate_velocity_to_grid(&mut self.ctx)?;
        self.stage_done(Stage::VelocityToGrid);
        if floored > 0 {
            self.record(EventKind::MassFloor {
                stage: Stage::VelocityToGrid,
                nodes: floored,
            });
        }

        if self.phase == Phase::Initializing {
            transfer::calculate_material_velocity_gradient(&mut self.ctx)?;
            self.stage_done(Stage::VelocityGradient);
            constitutive::initialize_material_tensors(&mut self.ctx)?;
            self.stage_done(Stage::InitializeTensors);
            constitutive::calculate_grid_volume(&mut self.ctx)?;
            self.stage_done(Stage::GridVolume);
            constitutive::calculate_material_density(&mut self.ctx)?;
            self.stage_done(Stage::Density);
            constitutive::calculate_material_initial_volume(&mut self.ctx)?;
            self.stage_done(Stage::InitialVolume);
            self.phase = Phase::Stepping;
            let volume: f64 = self
                .ctx
                .materials
                .iter()
                .map(|m| m.particles.total_volume())
                .sum();
            info!(volume, "material density and volume initialized");
            self.record(EventKind::Initialized {
                particles: self.ctx.particle_count(),
                volume,
            });
        }

        grid_solver::calculate_grid_internal_forces(&mut self.ctx)?;
        self.stage_done(Stage::InternalForces);
        let floored_acc = grid_solver::calculate_grid_acceleration(&mut self.ctx)?;
        self.stage_done(Stage::GridAcceleration);
        if floored_acc > 0 {
            self.record(EventKind::MassFloor {
                stage: Stage::GridAcceleration,
                nodes: floored_acc,
            });
        }
        floored = floored.max(floored_acc);
        grid_solver::update_grid_velocity(&mut self.ctx)?;
        self.stage_done(Stage::GridVelocity);

        transfer::calculate_material_velocity_gradient(&mut self.ctx)?;
        self.stage_done(Stage::VelocityGradient);
        constitutive::update_material_deformation_gradient(&mut self.ctx)?;
        self.stage_done(Stage::DeformationGradient);
        constitutive::update_material_volume(&mut self.ctx)?;
        self.stage_done(Stage::Volume);
        constitutive::update_material_stress(&mut self.ctx)?;
        self.stage_done(Stage::Stress);

        // Nodal fields are final here; G2P only reads them. The snapshot is
        // published once the particles have advanced.
        let snapshot =
            GridSnapshot::capture(step, self.time, self.ctx.dimension(), &self.ctx.nodes);
        diagnostics::log_ranges(&self.ctx);

        transfer::interpolate_acceleration_to_material(&mut self.ctx)?;
        self.stage_done(Stage::AccelerationToMaterial);
        transfer::interpolate_velocity_to_material(&mut self.ctx)?;
        self.stage_done(Stage::VelocityToMaterial);
        transfer::advect_material_particles(&mut self.ctx)?;
        self.stage_done(Stage::Advection);

        sink.write(snapshot)?;
        Ok(floored)
    }
}
