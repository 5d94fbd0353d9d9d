//! # strata-telemetry
//!
//! Event bus for simulation telemetry. The integrator emits structured
//! events (step timing, stage completion, mass conservation, floored
//! nodes, energy, halts) that pluggable sinks consume: an in-memory
//! [`VecSink`] for tests and inspection, and a [`TracingSink`] that
//! forwards to the `tracing` subscriber.

pub mod bus;
pub mod events;
pub mod sinks;

pub use bus::EventBus;
pub use events::{EventKind, SimulationEvent};
pub use sinks::{EventSink, TracingSink, VecSink};
