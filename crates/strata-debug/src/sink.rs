//! Output contract for per-step grid snapshots.

use strata_types::StrataResult;

use crate::snapshot::GridSnapshot;

/// Consumer of the snapshots the integrator emits once per step.
///
/// A failing `write` aborts the step like any other stage error.
pub trait SnapshotSink: Send {
    /// Accepts one snapshot.
    fn write(&mut self, snapshot: GridSnapshot) -> StrataResult<()>;

    /// Called once after the last step. Flush buffers, join threads, etc.
    fn finish(&mut self) -> StrataResult<()> {
        Ok(())
    }

    /// Returns a human-readable name for this sink.
    fn name(&self) -> &str;
}

/// Keeps every snapshot in memory.
#[derive(Debug, Default)]
pub struct VecSnapshotSink {
    pub snapshots: Vec<GridSnapshot>,
}

impl VecSnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent snapshot, if any.
    pub fn last(&self) -> Option<&GridSnapshot> {
        self.snapshots.last()
    }
}

impl SnapshotSink for VecSnapshotSink {
    fn write(&mut self, snapshot: GridSnapshot) -> StrataResult<()> {
        self.snapshots.push(snapshot);
        Ok(())
    }

    fn name(&self) -> &str {
        "vec_snapshot_sink"
    }
}

/// Discards snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSnapshotSink;

impl SnapshotSink for NullSnapshotSink {
    fn write(&mut self, _snapshot: GridSnapshot) -> StrataResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "null_snapshot_sink"
    }
}
