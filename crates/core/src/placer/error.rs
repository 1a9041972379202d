use std::path::PathBuf;
use thiserror::Error;

/// Why a copy into the library did not happen.
#[derive(Debug, Error)]
pub enum PlacerError {
    #[error("source file missing: {path}")]
    SourceNotFound { path: PathBuf },

    /// Another file already occupies the destination.
    #[error("destination already taken: {path}")]
    DestinationExists { path: PathBuf },

    #[error("cannot create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("copy {from} -> {to} failed: {error}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: std::io::Error,
    },

    /// The copy reads back different from what was written.
    #[error("copy of {path} is corrupt (sha256 {expected} != {actual})")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },
}

impl PlacerError {
    pub fn copy_failed(from: PathBuf, to: PathBuf, error: std::io::Error) -> Self {
        Self::Copy { from, to, error }
    }
}
