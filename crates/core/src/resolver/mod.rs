//! Destination layout.
//!
//! `<root>/<author>/<title>[ (Part N)]/<audio_subdir>/[DD_TT_]<file name>`

mod policy;

pub use policy::{policy_for, DiscSuffix, NoParts, PartPolicy};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::OrganizerConfig;
use crate::metadata::MetadataRecord;

/// Where a resolved file lands.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DestinationPath {
    pub root: PathBuf,
    pub author_dir: String,
    pub title_dir: String,
    pub audio_subdir: String,
    pub file_name: String,
}

impl DestinationPath {
    /// Full path of the copied audio file.
    pub fn full_path(&self) -> PathBuf {
        self.title_path()
            .join(&self.audio_subdir)
            .join(&self.file_name)
    }

    /// The title directory, where cover art goes.
    pub fn title_path(&self) -> PathBuf {
        self.root.join(&self.author_dir).join(&self.title_dir)
    }
}

/// Maps resolved metadata to a [`DestinationPath`].
pub struct PathResolver {
    unknown_author: String,
    audio_subdir: String,
    policy: Box<dyn PartPolicy>,
}

impl PathResolver {
    pub fn new(
        unknown_author: impl Into<String>,
        audio_subdir: impl Into<String>,
        policy: Box<dyn PartPolicy>,
    ) -> Self {
        Self {
            unknown_author: unknown_author.into(),
            audio_subdir: audio_subdir.into(),
            policy,
        }
    }

    pub fn from_config(config: &OrganizerConfig) -> Self {
        Self::new(
            config.unknown_author.clone(),
            config.audio_subdir.clone(),
            policy_for(config.part_policy),
        )
    }

    /// Pure and deterministic. Returns `None` when the record has no title.
    pub fn resolve(
        &self,
        record: &MetadataRecord,
        file_name: &str,
        dest_root: &Path,
    ) -> Option<DestinationPath> {
        let title = sanitize_component(record.title.as_deref()?);
        if title.is_empty() {
            return None;
        }

        let author = record
            .author
            .as_deref()
            .map(sanitize_component)
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| self.unknown_author.clone());

        let title_dir = match self.policy.part_marker(record) {
            Some(marker) => format!("{} ({})", title, marker),
            None => title,
        };

        Some(DestinationPath {
            root: dest_root.to_path_buf(),
            author_dir: author,
            title_dir,
            audio_subdir: self.audio_subdir.clone(),
            file_name: ordered_file_name(record, file_name),
        })
    }
}

/// Prefixes `DD_TT_` when either disc or track is known. The missing one is
/// written as `00`.
pub fn ordered_file_name(record: &MetadataRecord, file_name: &str) -> String {
    let file_name = sanitize_component(file_name);
    if record.disc_number.is_none() && record.track_number.is_none() {
        return file_name;
    }
    format!(
        "{:02}_{:02}_{}",
        record.disc_number.unwrap_or(0),
        record.track_number.unwrap_or(0),
        file_name
    )
}

/// Makes a metadata value safe to use as one path component.
pub fn sanitize_component(value: &str) -> String {
    let replaced: String = value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    replaced.trim().trim_end_matches('.').trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FieldValue, Tier};

    fn resolver() -> PathResolver {
        PathResolver::new("Unknown Author", "audiotrack", Box::new(DiscSuffix))
    }

    fn record(author: Option<&str>, title: Option<&str>) -> MetadataRecord {
        let mut r = MetadataRecord::new();
        r.fill_opt(author.map(|a| FieldValue::Author(a.into())), Tier::Filename);
        r.fill_opt(title.map(|t| FieldValue::Title(t.into())), Tier::Filename);
        r
    }

    #[test]
    fn test_basic_layout() {
        let dest = resolver()
            .resolve(
                &record(Some("Jane Doe"), Some("My Book")),
                "Jane Doe - My Book.mp3",
                Path::new("/dest"),
            )
            .unwrap();

        assert_eq!(
            dest.full_path(),
            PathBuf::from("/dest/Jane Doe/My Book/audiotrack/Jane Doe - My Book.mp3")
        );
        assert_eq!(dest.title_path(), PathBuf::from("/dest/Jane Doe/My Book"));
    }

    #[test]
    fn test_missing_title_is_not_resolvable() {
        let r = resolver();
        assert!(r
            .resolve(&record(Some("Jane"), None), "x.mp3", Path::new("/d"))
            .is_none());
        assert!(r
            .resolve(&record(Some("Jane"), Some("???")), "x.mp3", Path::new("/d"))
            .is_some());
    }

    #[test]
    fn test_unknown_author() {
        let dest = resolver()
            .resolve(&record(None, Some("Orphan")), "o.mp3", Path::new("/d"))
            .unwrap();
        assert_eq!(dest.author_dir, "Unknown Author");
    }

    #[test]
    fn test_track_prefix_is_zero_padded() {
        let mut r = record(Some("A"), Some("B"));
        r.fill(FieldValue::TrackNumber(7), Tier::EmbeddedTag);

        let dest = resolver().resolve(&r, "x.mp3", Path::new("/d")).unwrap();
        assert_eq!(dest.file_name, "00_07_x.mp3");

        r.fill(FieldValue::DiscNumber(1), Tier::EmbeddedTag);
        let dest = resolver().resolve(&r, "x.mp3", Path::new("/d")).unwrap();
        assert_eq!(dest.file_name, "01_07_x.mp3");
        assert_eq!(dest.title_dir, "B");
    }

    #[test]
    fn test_multi_part_suffix() {
        let mut r = record(Some("A"), Some("B"));
        r.fill(FieldValue::DiscNumber(2), Tier::EmbeddedTag);

        let dest = resolver().resolve(&r, "x.mp3", Path::new("/d")).unwrap();
        assert_eq!(dest.title_dir, "B (Part 2)");

        let flat = PathResolver::new("Unknown Author", "audiotrack", Box::new(NoParts));
        assert_eq!(flat.resolve(&r, "x.mp3", Path::new("/d")).unwrap().title_dir, "B");
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let mut r = record(Some("Jane Doe"), Some("My Book"));
        r.fill(FieldValue::DiscNumber(3), Tier::EmbeddedTag);
        r.fill(FieldValue::TrackNumber(11), Tier::EmbeddedTag);

        let a = resolver().resolve(&r, "f.m4b", Path::new("/d"));
        let b = resolver().resolve(&r, "f.m4b", Path::new("/d"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("AC/DC: Live?"), "AC_DC_ Live_");
        assert_eq!(sanitize_component("  Trailing... "), "Trailing");
        assert_eq!(sanitize_component("..."), "");
    }
}
