//! Per-run claimed destination map.

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Result of claiming a destination path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Accepted,
    /// Another source already owns the path.
    Rejected { existing_origin: PathBuf },
}

/// Tracks which source file owns each destination path in the current run.
///
/// `claim` is atomic across workers. The lock is never held across I/O.
#[derive(Debug, Default)]
pub struct DedupGuard {
    claimed: Mutex<HashMap<PathBuf, PathBuf>>,
}

impl DedupGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `dest` for `origin`. Re-claiming by the same origin succeeds;
    /// a rejected claim leaves the existing mapping untouched.
    pub fn claim(&self, dest: &Path, origin: &Path) -> ClaimOutcome {
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        match claimed.get(dest) {
            Some(existing) if existing.as_path() == origin => ClaimOutcome::Accepted,
            Some(existing) => ClaimOutcome::Rejected {
                existing_origin: existing.clone(),
            },
            None => {
                claimed.insert(dest.to_path_buf(), origin.to_path_buf());
                ClaimOutcome::Accepted
            }
        }
    }

    /// Drops a claim held by `origin`, so a file whose copy failed does not
    /// block the path.
    pub fn release(&self, dest: &Path, origin: &Path) {
        let mut claimed = self.claimed.lock().unwrap_or_else(|e| e.into_inner());
        if claimed.get(dest).is_some_and(|o| o.as_path() == origin) {
            claimed.remove(dest);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.claimed.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every claim. Called at run start.
    pub fn reset(&self) {
        self.claimed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_second_claim_is_rejected() {
        let guard = DedupGuard::new();
        let dest = Path::new("/d/A/B/audiotrack/x.mp3");

        assert_eq!(guard.claim(dest, Path::new("/in/1/x.mp3")), ClaimOutcome::Accepted);
        assert_eq!(
            guard.claim(dest, Path::new("/in/2/x.mp3")),
            ClaimOutcome::Rejected {
                existing_origin: PathBuf::from("/in/1/x.mp3")
            }
        );
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn test_same_origin_reclaims() {
        let guard = DedupGuard::new();
        let dest = Path::new("/d/x.mp3");
        guard.claim(dest, Path::new("/in/x.mp3"));
        assert_eq!(guard.claim(dest, Path::new("/in/x.mp3")), ClaimOutcome::Accepted);
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn test_release_only_by_owner() {
        let guard = DedupGuard::new();
        let dest = Path::new("/d/x.mp3");
        guard.claim(dest, Path::new("/in/a.mp3"));

        guard.release(dest, Path::new("/in/b.mp3"));
        assert_eq!(guard.len(), 1);

        guard.release(dest, Path::new("/in/a.mp3"));
        assert!(guard.is_empty());
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let guard = Arc::new(DedupGuard::new());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let guard = Arc::clone(&guard);
                std::thread::spawn(move || {
                    let origin = PathBuf::from(format!("/in/{}.mp3", i));
                    guard.claim(Path::new("/d/same.mp3"), &origin)
                })
            })
            .collect();

        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| *o == ClaimOutcome::Accepted)
            .count();
        assert_eq!(accepted, 1);
    }

    #[test]
    fn test_reset() {
        let guard = DedupGuard::new();
        guard.claim(Path::new("/d/x.mp3"), Path::new("/in/x.mp3"));
        guard.reset();
        assert!(guard.is_empty());
    }
}
