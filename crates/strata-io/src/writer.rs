//! Background snapshot writer.
//!
//! Snapshots are handed to a worker thread over a bounded channel and
//! written as one bincode file per step, so the step loop only blocks
//! when `capacity` snapshots are already waiting.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread::{self, JoinHandle};

use strata_debug::{GridSnapshot, SnapshotSink};
use strata_types::{StrataError, StrataResult};
use tracing::{debug, warn};

/// File name of the snapshot for `step`.
pub fn snapshot_file_name(step: u64) -> String {
    format!("snapshot_{step:06}.bin")
}

/// Reads one snapshot file written by [`SnapshotWriter`].
pub fn read_snapshot(path: &Path) -> StrataResult<GridSnapshot> {
    let bytes = fs::read(path)?;
    GridSnapshot::from_bytes(&bytes)
}

/// [`SnapshotSink`] that writes snapshots to a directory on a worker thread.
pub struct SnapshotWriter {
    dir: PathBuf,
    sender: Option<SyncSender<GridSnapshot>>,
    worker: Option<JoinHandle<StrataResult<usize>>>,
    written: usize,
}

impl SnapshotWriter {
    /// Creates `dir` if needed and starts the worker.
    pub fn new(dir: impl Into<PathBuf>, capacity: usize) -> StrataResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let (sender, receiver) = sync_channel(capacity.max(1));
        let worker_dir = dir.clone();
        let worker = thread::Builder::new()
            .name("strata-snapshot-writer".into())
            .spawn(move || Self::worker_loop(&worker_dir, receiver))?;
        Ok(Self {
            dir,
            sender: Some(sender),
            worker: Some(worker),
            written: 0,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Snapshots written by the worker; known after [`finish`](SnapshotSink::finish).
    pub fn written(&self) -> usize {
        self.written
    }

    fn worker_loop(dir: &Path, receiver: Receiver<GridSnapshot>) -> StrataResult<usize> {
        let mut count = 0;
        while let Ok(snapshot) = receiver.recv() {
            let path = dir.join(snapshot_file_name(snapshot.step));
            fs::write(&path, snapshot.to_bytes()?)?;
            debug!(step = snapshot.step, path = %path.display(), "snapshot written");
            count += 1;
        }
        Ok(count)
    }

    fn join_worker(&mut self) -> StrataResult<()> {
        self.sender.take();
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        match worker.join() {
            Ok(result) => {
                self.written = result?;
                Ok(())
            }
            Err(_) => Err(StrataError::Io(std::io::Error::new(
                ErrorKind::Other,
                "snapshot writer thread panicked",
            ))),
        }
    }
}

impl SnapshotSink for SnapshotWriter {
    fn write(&mut self, snapshot: GridSnapshot) -> StrataResult<()> {
        let Some(sender) = &self.sender else {
            return Err(StrataError::Io(std::io::Error::new(
                ErrorKind::BrokenPipe,
                "snapshot writer already finished",
            )));
        };
        if sender.send(snapshot).is_ok() {
            return Ok(());
        }
        // The worker only hangs up after a failed write; surface its error.
        self.join_worker()?;
        Err(StrataError::Io(std::io::Error::new(
            ErrorKind::BrokenPipe,
            "snapshot writer stopped",
        )))
    }

    fn finish(&mut self) -> StrataResult<()> {
        self.join_worker()
    }

    fn name(&self) -> &str {
        "snapshot_writer"
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        if let Err(err) = self.join_worker() {
            warn!(%err, "snapshot writer failed during shutdown");
        }
    }
}
