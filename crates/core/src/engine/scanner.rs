//! Source tree discovery and static work partitioning.

use std::path::PathBuf;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::metadata::SourceFile;

/// Recursively lists audio files under each source directory.
///
/// Entries are visited in file-name order so the result is stable across
/// runs. Missing directories and unreadable entries are logged and skipped.
pub fn scan(source_dirs: &[PathBuf], extensions: &[String]) -> Vec<SourceFile> {
    let extensions: Vec<String> = extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
        .collect();

    let mut files = Vec::new();
    for dir in source_dirs {
        if !dir.is_dir() {
            warn!(dir = ?dir, "Source directory does not exist, skipping");
            continue;
        }

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let Some(file) = SourceFile::from_path(entry.into_path()) else {
                continue;
            };
            if extensions.iter().any(|e| *e == file.extension) {
                files.push(file);
            }
        }
    }

    debug!("Scanned {} audio file(s)", files.len());
    files
}

/// Splits files into strided shards: file `i` goes to shard `i % n`.
///
/// The shard count is clamped to `1..=files.len()`; an empty list yields no
/// shards. Each shard keeps scan order.
pub fn partition(files: Vec<SourceFile>, workers: usize) -> Vec<Vec<SourceFile>> {
    let count = workers.max(1).min(files.len());
    let mut shards: Vec<Vec<SourceFile>> = (0..count).map(|_| Vec::new()).collect();
    for (i, file) in files.into_iter().enumerate() {
        shards[i % count].push(file);
    }
    shards
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec!["mp3".into(), ".M4B".into()]
    }

    #[test]
    fn test_scan_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("b")).unwrap();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("b/2.mp3"), b"x").unwrap();
        fs::write(root.join("b/1.MP3"), b"x").unwrap();
        fs::write(root.join("a/book.m4b"), b"x").unwrap();
        fs::write(root.join("a/cover.jpg"), b"x").unwrap();
        fs::write(root.join("notes.txt"), b"x").unwrap();

        let files = scan(&[root.to_path_buf()], &exts());
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["book.m4b", "1.MP3", "2.mp3"]);
    }

    #[test]
    fn test_scan_skips_missing_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("x.mp3"), b"x").unwrap();

        let files = scan(
            &[temp.path().join("missing"), temp.path().to_path_buf()],
            &exts(),
        );
        assert_eq!(files.len(), 1);
    }

    fn files(n: usize) -> Vec<SourceFile> {
        (0..n)
            .map(|i| SourceFile::from_path(format!("/in/{:02}.mp3", i)).unwrap())
            .collect()
    }

    #[test]
    fn test_partition_is_strided() {
        let shards = partition(files(7), 3);
        assert_eq!(shards.len(), 3);
        let names: Vec<Vec<&str>> = shards
            .iter()
            .map(|s| s.iter().map(|f| f.file_name.as_str()).collect())
            .collect();
        assert_eq!(names[0], vec!["00.mp3", "03.mp3", "06.mp3"]);
        assert_eq!(names[1], vec!["01.mp3", "04.mp3"]);
        assert_eq!(names[2], vec!["02.mp3", "05.mp3"]);
    }

    #[test]
    fn test_partition_clamps_worker_count() {
        assert_eq!(partition(files(2), 4).len(), 2);
        assert_eq!(partition(files(3), 0).len(), 1);
        assert!(partition(Vec::new(), 4).is_empty());
    }
}
