//! # strata-debug
//!
//! Inspection hooks and grid snapshots for monitoring and debugging runs.
//! The integrator pushes one [`GridSnapshot`] per step into a
//! [`SnapshotSink`] and calls [`InspectionHook`]s at step and stage
//! boundaries. Snapshots serialize to compact binary with `bincode`.

pub mod hooks;
pub mod sink;
pub mod snapshot;

pub use hooks::{InspectionHook, TelemetryHook};
pub use sink::{NullSnapshotSink, SnapshotSink, VecSnapshotSink};
pub use snapshot::GridSnapshot;
