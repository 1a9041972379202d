//! Durable accepted/rejected logs and the pending-unidentified set.

mod store;
mod types;

pub use store::{to_csv, CsvRegistryStore, RegistryStore, ACCEPTED_HEADER, REJECTED_HEADER};
pub use types::{AcceptedEntry, RejectReason, RejectedEntry};

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::info;

use crate::config::RegistryConfig;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registry CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Append-only registry plus the in-memory set of files awaiting manual
/// resolution.
///
/// Log rows are never rewritten. Only the pending set shrinks, when a file
/// is resolved or denied.
pub struct Registry {
    store: Arc<dyn RegistryStore>,
    state: Mutex<PendingState>,
}

/// Files awaiting resolution, plus origins that were accepted or denied and
/// must never become pending again.
#[derive(Default)]
struct PendingState {
    pending: BTreeMap<PathBuf, RejectedEntry>,
    settled: HashSet<PathBuf>,
}

impl Registry {
    /// Wraps a store and rebuilds the pending set from its history.
    ///
    /// A file is pending when it was logged as unidentifiable and has neither
    /// an accepted row nor a denied row.
    pub fn open(store: Arc<dyn RegistryStore>) -> Result<Self, RegistryError> {
        let rejected = store.load_rejected()?;
        let settled: HashSet<PathBuf> = store
            .load_accepted()?
            .into_iter()
            .map(|e| e.origin)
            .chain(
                rejected
                    .iter()
                    .filter(|e| e.reason == RejectReason::Denied)
                    .map(|e| e.origin.clone()),
            )
            .collect();

        let pending: BTreeMap<PathBuf, RejectedEntry> = rejected
            .into_iter()
            .filter(|e| e.reason == RejectReason::Unidentifiable)
            .filter(|e| !settled.contains(&e.origin))
            .map(|e| (e.origin.clone(), e))
            .collect();

        if !pending.is_empty() {
            info!("Restored {} pending file(s) from registry", pending.len());
        }

        Ok(Self {
            store,
            state: Mutex::new(PendingState { pending, settled }),
        })
    }

    /// Opens the CSV logs named in configuration.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, RegistryError> {
        let store = CsvRegistryStore::open(&config.rejected_log, &config.accepted_log)?;
        Self::open(Arc::new(store))
    }

    /// Logs a rejected file. Unidentifiable files join the pending set
    /// unless they were already accepted or denied.
    pub fn reject(
        &self,
        origin: &Path,
        file_name: &str,
        reason: RejectReason,
    ) -> Result<(), RegistryError> {
        let entry = RejectedEntry::new(origin, file_name, reason);
        self.store.append_rejected(&entry)?;

        if reason == RejectReason::Unidentifiable {
            let mut state = self.lock_state();
            if !state.settled.contains(&entry.origin) {
                state.pending.insert(entry.origin.clone(), entry);
            }
        }
        Ok(())
    }

    /// Logs a placed file and drops it from the pending set.
    pub fn accept(&self, entry: AcceptedEntry) -> Result<(), RegistryError> {
        self.store.append_accepted(&entry)?;
        let mut state = self.lock_state();
        state.pending.remove(&entry.origin);
        state.settled.insert(entry.origin);
        Ok(())
    }

    /// Dismisses a pending file. Returns `false` if it was not pending.
    pub fn deny(&self, origin: &Path) -> Result<bool, RegistryError> {
        let Some(entry) = self.pending_entry(origin) else {
            return Ok(false);
        };
        self.store
            .append_rejected(&RejectedEntry::new(origin, entry.file_name, RejectReason::Denied))?;
        let mut state = self.lock_state();
        state.pending.remove(origin);
        state.settled.insert(origin.to_path_buf());
        Ok(true)
    }

    /// Pending files ordered by origin path.
    pub fn pending(&self) -> Vec<RejectedEntry> {
        self.lock_state().pending.values().cloned().collect()
    }

    pub fn pending_entry(&self, origin: &Path) -> Option<RejectedEntry> {
        self.lock_state().pending.get(origin).cloned()
    }

    pub fn is_pending(&self, origin: &Path) -> bool {
        self.lock_state().pending.contains_key(origin)
    }

    pub fn rejected(&self) -> Result<Vec<RejectedEntry>, RegistryError> {
        self.store.load_rejected()
    }

    pub fn accepted(&self) -> Result<Vec<AcceptedEntry>, RegistryError> {
        self.store.load_accepted()
    }

    /// The rejected log as a CSV document.
    pub fn rejected_csv(&self) -> Result<Vec<u8>, RegistryError> {
        to_csv(REJECTED_HEADER, &self.rejected()?)
    }

    /// The accepted log as a CSV document.
    pub fn accepted_csv(&self) -> Result<Vec<u8>, RegistryError> {
        to_csv(ACCEPTED_HEADER, &self.accepted()?)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, PendingState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
