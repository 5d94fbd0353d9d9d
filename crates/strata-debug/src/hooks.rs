//! Inspection hooks for live debugging.
//!
//! Hooks are injected into the integrator loop and called at step and
//! stage boundaries to capture metrics without modifying solver code.

use strata_telemetry::{EventKind, SimulationEvent};
use strata_types::Stage;

/// Trait for simulation inspection hooks.
///
/// Hooks are read-only observers: they receive step indices and timings,
/// never mutable solver state.
///
/// # Lifecycle
///
/// ```text
/// for each step:
///   hook.on_step_begin(...)
///   for each completed stage:
///     hook.on_stage(...)
///   hook.on_step_end(...)      (or hook.on_halt(...) on failure)
/// hook.on_simulation_end()
/// ```
pub trait InspectionHook: Send {
    /// Called at the beginning of each step.
    fn on_step_begin(&mut self, step: u64, sim_time: f64) {
        let _ = (step, sim_time);
    }

    /// Called after each stage of the step completes.
    fn on_stage(&mut self, step: u64, stage: Stage) {
        let _ = (step, stage);
    }

    /// Called at the end of each successful step.
    fn on_step_end(&mut self, step: u64, wall_time: f64) {
        let _ = (step, wall_time);
    }

    /// Called when a step fails and the integrator halts.
    fn on_halt(&mut self, step: u64, reason: &str) {
        let _ = (step, reason);
    }

    /// Called when the simulation completes.
    fn on_simulation_end(&mut self) {}

    /// Returns the hook's name for logging.
    fn name(&self) -> &str;
}

/// Hook that records lifecycle calls as telemetry events.
///
/// The caller drains the collected events and forwards them to a bus.
#[derive(Debug, Default)]
pub struct TelemetryHook {
    events: Vec<SimulationEvent>,
    /// Record a `StageCompleted` event for every stage (verbose).
    pub record_stages: bool,
}

impl TelemetryHook {
    /// Creates a new telemetry hook that records step boundaries only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a hook that also records every completed stage.
    pub fn verbose() -> Self {
        Self {
            events: Vec::new(),
            record_stages: true,
        }
    }

    /// Drains collected events for dispatch.
    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }
}

impl InspectionHook for TelemetryHook {
    fn on_step_begin(&mut self, step: u64, sim_time: f64) {
        self.events
            .push(SimulationEvent::new(step, EventKind::StepBegin { sim_time }));
    }

    fn on_stage(&mut self, step: u64, stage: Stage) {
        if self.record_stages {
            self.events
                .push(SimulationEvent::new(step, EventKind::StageCompleted { stage }));
        }
    }

    fn on_step_end(&mut self, step: u64, wall_time: f64) {
        self.events
            .push(SimulationEvent::new(step, EventKind::StepEnd { wall_time }));
    }

    fn on_halt(&mut self, step: u64, reason: &str) {
        self.events.push(SimulationEvent::new(
            step,
            EventKind::Halted {
                reason: reason.to_string(),
            },
        ));
    }

    fn name(&self) -> &str {
        "telemetry_hook"
    }
}
