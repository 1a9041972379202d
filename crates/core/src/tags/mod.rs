//! Embedded tag capability.
//!
//! The engine only talks to [`TagReader`] and [`TagWriter`]; [`LoftyTags`]
//! is the production adapter and `testing::MockTagReader` /
//! `testing::MockTagWriter` are deterministic fakes.

mod lofty_tags;

pub use lofty_tags::LoftyTags;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Container formats with readable tags.
pub const TAGGED_EXTENSIONS: &[&str] = &["mp3", "m4a", "m4b", "mp4"];

/// Errors that can occur while reading or writing tags.
#[derive(Debug, Error)]
pub enum TagError {
    /// The file's container format has no supported tag layout.
    #[error("Unsupported tag format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The file could not be parsed.
    #[error("Failed to read tags from {path}: {message}")]
    ReadFailed { path: PathBuf, message: String },

    /// Tags could not be saved.
    #[error("Failed to write tags to {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// The blocking task running the read was cancelled or panicked.
    #[error("Tag task failed: {0}")]
    TaskFailed(String),
}

/// Tag fields relevant to book identification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
    pub year: Option<u32>,
}

impl EmbeddedTags {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Fields to write back into a file. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagUpdate {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
}

/// Reads embedded tags. Implementations are blocking.
pub trait TagReader: Send + Sync {
    /// Whether this reader understands the file's container.
    fn supports(&self, path: &Path) -> bool {
        has_tagged_extension(path)
    }

    fn read(&self, path: &Path) -> Result<EmbeddedTags, TagError>;
}

/// Writes embedded tags. Implementations are blocking.
pub trait TagWriter: Send + Sync {
    fn write(&self, path: &Path, update: &TagUpdate) -> Result<(), TagError>;
}

pub(crate) fn has_tagged_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| TAGGED_EXTENSIONS.contains(&e.as_str()))
}
