//! Cooperative pause signal checked at file boundaries.

use tokio::sync::watch;

/// Shared pause flag. Workers block on it, they never poll.
#[derive(Debug)]
pub struct PauseGate {
    paused: watch::Sender<bool>,
}

impl Default for PauseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl PauseGate {
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self { paused }
    }

    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Returns immediately when not paused, otherwise sleeps until resumed.
    pub async fn wait_until_resumed(&self) {
        let mut rx = self.paused.subscribe();
        // The sender lives as long as the gate, so this only ends on resume
        let _ = rx.wait_for(|paused| !*paused).await;
    }
}
