//! Sibling cover art discovery and copy.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::placer::{FilePlacement, Placer, PlacerError};
use crate::resolver::DestinationPath;

pub const COVER_FILE_NAME: &str = "cover.jpg";

/// Finds the first image in `folder` named `*cover.jpg` or `<title>*.jpg`
/// (case-insensitive, in name order).
pub async fn locate_cover_art(folder: &Path, title: &str) -> Option<PathBuf> {
    let mut entries = match tokio::fs::read_dir(folder).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(folder = ?folder, "Cannot list folder for cover art: {}", e);
            return None;
        }
    };

    let title = title.to_lowercase();
    let mut candidates = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let name = entry.file_name().to_string_lossy().to_lowercase();
        let is_cover = name.ends_with(COVER_FILE_NAME)
            || (!title.is_empty() && name.starts_with(&title) && name.ends_with(".jpg"));
        if is_cover && entry.file_type().await.is_ok_and(|t| t.is_file()) {
            candidates.push(entry.path());
        }
    }

    candidates.sort();
    candidates.into_iter().next()
}

/// Copies cover art next to the audio subdirectory unless the title
/// directory already has one. Failures are logged only.
pub async fn copy_cover_art(
    placer: &dyn Placer,
    source_folder: &Path,
    title: &str,
    dest: &DestinationPath,
) {
    let target = dest.title_path().join(COVER_FILE_NAME);
    if tokio::fs::try_exists(&target).await.unwrap_or(false) {
        return;
    }

    let Some(cover) = locate_cover_art(source_folder, title).await else {
        return;
    };

    match placer.place(FilePlacement::new(&cover, &target)).await {
        Ok(_) => debug!(cover = ?cover, "Copied cover art"),
        // Another worker got there first
        Err(PlacerError::DestinationExists { .. }) => {}
        Err(e) => warn!(cover = ?cover, "Failed to copy cover art: {}", e),
    }
}
