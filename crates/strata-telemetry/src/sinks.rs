//! Pluggable event sinks.
//!
//! Sinks consume events from the bus and process them
//! (collect in memory, forward to `tracing`, write to a file).

use std::sync::{Arc, Mutex};

use crate::events::{EventKind, SimulationEvent};

/// Trait for event consumers.
///
/// Implement this to create custom telemetry outputs.
pub trait EventSink: Send {
    /// Process a single event.
    fn handle(&mut self, event: &SimulationEvent);

    /// Called when the simulation ends. Flush buffers, close files, etc.
    fn finalize(&mut self) {}

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Shared, inspectable list of collected events.
pub type EventLog = Arc<Mutex<Vec<SimulationEvent>>>;

/// A sink that collects events in memory for testing and inspection.
///
/// The event list is shared, so a caller can keep a [`VecSink::log`]
/// handle after the sink itself has been boxed into a bus.
#[derive(Default)]
pub struct VecSink {
    events: EventLog,
}

impl VecSink {
    /// Creates an empty vec sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the collected events.
    pub fn log(&self) -> EventLog {
        Arc::clone(&self.events)
    }

    /// Copies out the events collected so far.
    pub fn events(&self) -> Vec<SimulationEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl EventSink for VecSink {
    fn handle(&mut self, event: &SimulationEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }

    fn name(&self) -> &str {
        "vec_sink"
    }
}

/// A sink that logs events using the `tracing` crate.
///
/// Routine events go out at the configured level; halts are always
/// logged as warnings.
pub struct TracingSink {
    level: tracing::Level,
}

impl TracingSink {
    /// Creates a new tracing sink at the given log level.
    pub fn new(level: tracing::Level) -> Self {
        Self { level }
    }
}

impl Default for TracingSink {
    fn default() -> Self {
        Self::new(tracing::Level::DEBUG)
    }
}

impl EventSink for TracingSink {
    fn handle(&mut self, event: &SimulationEvent) {
        if let EventKind::Halted { reason } = &event.kind {
            tracing::warn!(step = event.step, %reason, "simulation_halted");
            return;
        }
        if self.level == tracing::Level::TRACE {
            tracing::trace!(step = event.step, event = ?event.kind, "simulation_event");
        } else if self.level == tracing::Level::DEBUG {
            tracing::debug!(step = event.step, event = ?event.kind, "simulation_event");
        } else {
            tracing::info!(step = event.step, event = ?event.kind, "simulation_event");
        }
    }

    fn name(&self) -> &str {
        "tracing_sink"
    }
}
