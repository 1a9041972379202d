//! Core metadata types shared by every extraction tier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// An audio file discovered during the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Full path to the file.
    pub path: PathBuf,
    /// File name including extension.
    pub file_name: String,
    /// Lowercased extension without the dot (empty if none).
    pub extension: String,
    /// Directory holding the file.
    pub containing_folder: PathBuf,
}

impl SourceFile {
    /// Builds a source file from a path. Returns `None` for paths without a
    /// UTF-8 file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let file_name = path.file_name()?.to_str()?.to_string();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let containing_folder = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Some(Self {
            path,
            file_name,
            extension,
            containing_folder,
        })
    }

    /// File name with the extension stripped.
    pub fn stem(&self) -> &str {
        if self.extension.is_empty() {
            return &self.file_name;
        }
        let cut = self.file_name.len() - self.extension.len() - 1;
        &self.file_name[..cut]
    }
}

/// Stage of the resolution chain that supplied a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Filename,
    EmbeddedTag,
    ExternalLookup,
    /// Supplied by an operator during manual resolution.
    Manual,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Filename => "filename",
            Tier::EmbeddedTag => "embedded_tag",
            Tier::ExternalLookup => "external_lookup",
            Tier::Manual => "manual",
        }
    }
}

/// Fields tracked in a [`MetadataRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Isbn,
    Author,
    Title,
    Series,
    SeriesSequence,
    PublishYear,
    Narrator,
    DiscNumber,
    TrackNumber,
}

/// A value for one field of a [`MetadataRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Isbn(String),
    Author(String),
    Title(String),
    Series(String),
    SeriesSequence(String),
    PublishYear(u32),
    Narrator(String),
    DiscNumber(u32),
    TrackNumber(u32),
}

impl FieldValue {
    pub fn field(&self) -> Field {
        match self {
            FieldValue::Isbn(_) => Field::Isbn,
            FieldValue::Author(_) => Field::Author,
            FieldValue::Title(_) => Field::Title,
            FieldValue::Series(_) => Field::Series,
            FieldValue::SeriesSequence(_) => Field::SeriesSequence,
            FieldValue::PublishYear(_) => Field::PublishYear,
            FieldValue::Narrator(_) => Field::Narrator,
            FieldValue::DiscNumber(_) => Field::DiscNumber,
            FieldValue::TrackNumber(_) => Field::TrackNumber,
        }
    }
}

/// Which tier supplied each populated field.
pub type Provenance = BTreeMap<Field, Tier>;

/// Bibliographic metadata for one file, built up tier by tier.
///
/// Fields are write-once: [`MetadataRecord::fill`] only sets a field that is
/// still empty, so an earlier tier is never overwritten by a later one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_sequence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_year: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disc_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub provenance: Provenance,
}

impl MetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field if it is still empty. Blank strings and zero numbers
    /// count as absent. Returns whether the record changed.
    pub fn fill(&mut self, value: FieldValue, tier: Tier) -> bool {
        let field = value.field();
        let changed = match value {
            FieldValue::Isbn(v) => fill_text(&mut self.isbn, v),
            FieldValue::Author(v) => fill_text(&mut self.author, v),
            FieldValue::Title(v) => fill_text(&mut self.title, v),
            FieldValue::Series(v) => fill_text(&mut self.series, v),
            FieldValue::SeriesSequence(v) => fill_text(&mut self.series_sequence, v),
            FieldValue::Narrator(v) => fill_text(&mut self.narrator, v),
            FieldValue::PublishYear(v) => fill_number(&mut self.publish_year, v),
            FieldValue::DiscNumber(v) => fill_number(&mut self.disc_number, v),
            FieldValue::TrackNumber(v) => fill_number(&mut self.track_number, v),
        };
        if changed {
            self.provenance.insert(field, tier);
        }
        changed
    }

    /// Fills from an optional value, ignoring `None`.
    pub fn fill_opt(&mut self, value: Option<FieldValue>, tier: Tier) -> bool {
        value.map(|v| self.fill(v, tier)).unwrap_or(false)
    }

    /// Tier that supplied a field, if it is populated.
    pub fn source_of(&self, field: Field) -> Option<Tier> {
        self.provenance.get(&field).copied()
    }

    /// Whether a non-blank title has been resolved.
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn has_author(&self) -> bool {
        self.author.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

fn fill_text(slot: &mut Option<String>, value: String) -> bool {
    let value = value.trim();
    if slot.is_some() || value.is_empty() {
        return false;
    }
    *slot = Some(value.to_string());
    true
}

fn fill_number(slot: &mut Option<u32>, value: u32) -> bool {
    if slot.is_some() || value == 0 {
        return false;
    }
    *slot = Some(value);
    true
}

/// Parses a numeric token such as `"3"` or `"3/12"`. Malformed tokens are
/// treated as absent.
pub fn parse_number(token: &str) -> Option<u32> {
    let head = token.split('/').next()?.trim();
    head.parse::<u32>().ok().filter(|n| *n > 0)
}
