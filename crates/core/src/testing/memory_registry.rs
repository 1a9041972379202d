//! In-memory registry store for testing.

use std::sync::Mutex;

use crate::registry::{AcceptedEntry, RegistryError, RegistryStore, RejectedEntry};

/// Registry store that keeps rows in memory.
#[derive(Debug, Default)]
pub struct MemoryRegistryStore {
    rejected: Mutex<Vec<RejectedEntry>>,
    accepted: Mutex<Vec<AcceptedEntry>>,
}

impl MemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistryStore for MemoryRegistryStore {
    fn append_rejected(&self, entry: &RejectedEntry) -> Result<(), RegistryError> {
        self.rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());
        Ok(())
    }

    fn append_accepted(&self, entry: &AcceptedEntry) -> Result<(), RegistryError> {
        self.accepted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());
        Ok(())
    }

    fn load_rejected(&self) -> Result<Vec<RejectedEntry>, RegistryError> {
        Ok(self
            .rejected
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn load_accepted(&self) -> Result<Vec<AcceptedEntry>, RegistryError> {
        Ok(self
            .accepted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }
}
