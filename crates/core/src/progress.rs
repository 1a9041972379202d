//! Per-worker progress counters.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// One worker's position in its shard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerProgress {
    pub processed: u64,
    pub current_folder: Option<PathBuf>,
}

/// Point-in-time copy of every worker's progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    pub workers: BTreeMap<usize, WorkerProgress>,
    pub total_files: u64,
}

impl ProgressState {
    /// Files processed across all workers.
    pub fn processed(&self) -> u64 {
        self.workers.values().map(|w| w.processed).sum()
    }
}

/// Shared progress counters.
///
/// Every mutation and the snapshot go through one lock, so a snapshot never
/// shows one field of a worker updated without the other.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zeroes all counters for a new run.
    pub fn reset(&self, total_files: u64, workers: usize) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.total_files = total_files;
        state.workers = (0..workers).map(|id| (id, WorkerProgress::default())).collect();
    }

    pub fn advance(&self, worker_id: usize) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.workers.entry(worker_id).or_default().processed += 1;
    }

    pub fn set_current_folder(&self, worker_id: usize, folder: &Path) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.workers.entry(worker_id).or_default().current_folder = Some(folder.to_path_buf());
    }

    pub fn snapshot(&self) -> ProgressState {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
