//! Types for the placer module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single copy request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePlacement {
    /// Source file path.
    pub source: PathBuf,
    /// Destination file path.
    pub destination: PathBuf,
    /// Compare SHA-256 of source and copy after writing.
    pub verify_checksum: bool,
}

impl FilePlacement {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            verify_checksum: false,
        }
    }

    pub fn with_checksum(mut self, verify: bool) -> Self {
        self.verify_checksum = verify;
        self
    }
}

/// Information about a placed file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedFile {
    /// Final destination path.
    pub destination: PathBuf,
    /// File size in bytes.
    pub size_bytes: u64,
    /// SHA-256 of the copy, if verified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_defaults() {
        let placement = FilePlacement::new("/in/a.mp3", "/out/a.mp3");
        assert!(!placement.verify_checksum);

        let placement = placement.with_checksum(true);
        assert!(placement.verify_checksum);
        assert_eq!(placement.destination, PathBuf::from("/out/a.mp3"));
    }
}
