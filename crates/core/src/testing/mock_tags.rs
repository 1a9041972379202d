//! Mock tag reader and writer for testing.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::tags::{EmbeddedTags, TagError, TagReader, TagUpdate, TagWriter};

/// Tag reader serving canned tags per path.
///
/// Paths without canned tags read as empty. Paths marked with
/// [`MockTagReader::fail_for`] fail like a corrupt file.
#[derive(Debug, Default)]
pub struct MockTagReader {
    tags: RwLock<HashMap<PathBuf, EmbeddedTags>>,
    failing: RwLock<HashSet<PathBuf>>,
    reads: RwLock<Vec<PathBuf>>,
}

impl MockTagReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tags(&self, path: impl Into<PathBuf>, tags: EmbeddedTags) {
        self.tags
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into(), tags);
    }

    pub fn fail_for(&self, path: impl Into<PathBuf>) {
        self.failing
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(path.into());
    }

    /// Paths read so far, in order.
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl TagReader for MockTagReader {
    fn read(&self, path: &Path) -> Result<EmbeddedTags, TagError> {
        self.reads
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_path_buf());

        if self
            .failing
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(path)
        {
            return Err(TagError::ReadFailed {
                path: path.to_path_buf(),
                message: "simulated corrupt tags".to_string(),
            });
        }

        Ok(self
            .tags
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(path)
            .cloned()
            .unwrap_or_default())
    }
}

/// Tag writer that records every write instead of touching files.
#[derive(Debug, Default)]
pub struct MockTagWriter {
    writes: RwLock<Vec<(PathBuf, TagUpdate)>>,
}

impl MockTagWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<(PathBuf, TagUpdate)> {
        self.writes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl TagWriter for MockTagWriter {
    fn write(&self, path: &Path, update: &TagUpdate) -> Result<(), TagError> {
        self.writes
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((path.to_path_buf(), update.clone()));
        Ok(())
    }
}
