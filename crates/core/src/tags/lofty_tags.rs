//! Tag adapter backed by `lofty`.

use lofty::config::WriteOptions;
use lofty::file::{AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, Tag, TagType};
use std::path::Path;
use tracing::debug;

use super::{EmbeddedTags, TagError, TagReader, TagUpdate, TagWriter};

/// Reads and writes ID3v2 (mp3) and MP4 ilst (m4a/m4b/mp4) tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoftyTags;

impl LoftyTags {
    pub fn new() -> Self {
        Self
    }
}

impl TagReader for LoftyTags {
    fn read(&self, path: &Path) -> Result<EmbeddedTags, TagError> {
        if !self.supports(path) {
            return Err(TagError::UnsupportedFormat(path.to_path_buf()));
        }

        let tagged_file = Probe::open(path)
            .and_then(|opened| opened.read())
            .map_err(|e| TagError::ReadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            debug!(file = ?path, "No tags found in audio file");
            return Ok(EmbeddedTags::default());
        };

        Ok(EmbeddedTags {
            title: tag.title().map(|v| v.to_string()),
            artist: tag.artist().map(|v| v.to_string()),
            album: tag.album().map(|v| v.to_string()),
            track: tag.track(),
            disc: tag.disk(),
            year: tag.year(),
        })
    }
}

impl TagWriter for LoftyTags {
    fn write(&self, path: &Path, update: &TagUpdate) -> Result<(), TagError> {
        if !self.supports(path) {
            return Err(TagError::UnsupportedFormat(path.to_path_buf()));
        }

        let write_failed = |message: String| TagError::WriteFailed {
            path: path.to_path_buf(),
            message,
        };

        let mut tagged_file = Probe::open(path)
            .and_then(|opened| opened.read())
            .map_err(|e| write_failed(e.to_string()))?;

        let tag_type = default_tag_type(path);
        if tagged_file.tag(tag_type).is_none() {
            tagged_file.insert_tag(Tag::new(tag_type));
        }
        let tag = tagged_file
            .tag_mut(tag_type)
            .ok_or_else(|| write_failed("tag container unavailable".to_string()))?;

        if let Some(value) = &update.title {
            tag.set_title(value.clone());
        }
        if let Some(value) = &update.artist {
            tag.set_artist(value.clone());
        }
        if let Some(value) = &update.album {
            tag.set_album(value.clone());
        }
        if let Some(value) = update.track.filter(|v| *v > 0) {
            tag.set_track(value);
        }
        if let Some(value) = update.disc.filter(|v| *v > 0) {
            tag.set_disk(value);
        }

        tagged_file
            .save_to_path(path, WriteOptions::default())
            .map_err(|e| write_failed(e.to_string()))
    }
}

fn default_tag_type(path: &Path) -> TagType {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" | "m4a" | "m4b" => TagType::Mp4Ilst,
        _ => TagType::Id3v2,
    }
}
