//! Types for the organization engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::metadata::{FieldValue, MetadataRecord, Tier};
use crate::progress::ProgressState;
use crate::registry::{RegistryError, RejectedEntry};
use crate::tags::TagUpdate;

/// Run lifecycle: `Idle -> Running <-> Paused -> Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
    Completed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Completed => "completed",
        }
    }

    /// Whether workers may still be processing files.
    pub fn is_active(&self) -> bool {
        matches!(self, RunState::Running | RunState::Paused)
    }
}

/// Why one file was not placed. Never aborts a worker or the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileFailure {
    /// No title after every tier.
    #[error("no title could be resolved")]
    ExtractionFailure,

    /// The destination is claimed in this run or already on disk.
    #[error("destination already taken: {destination}")]
    DestinationCollision {
        destination: PathBuf,
        /// The source that claimed it first in this run, if any.
        existing_origin: Option<PathBuf>,
    },

    /// The copy itself failed; the source is left where it was.
    #[error("copy to {destination} failed: {message}")]
    CopyFailure {
        destination: PathBuf,
        message: String,
    },
}

impl FileFailure {
    /// Label used for the per-outcome metric.
    pub fn outcome_label(&self) -> &'static str {
        match self {
            FileFailure::ExtractionFailure => "unidentifiable",
            FileFailure::DestinationCollision { .. } => "duplicate",
            FileFailure::CopyFailure { .. } => "copy_failed",
        }
    }
}

/// Errors surfaced to engine callers.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The destination root could not be created. Fatal for the run.
    #[error("destination root unavailable: {path}: {source}")]
    DestinationRootUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("a run is already in progress")]
    AlreadyRunning,

    /// The destination root lies inside a source directory.
    #[error("destination root {dest_root} is inside source dir {source_dir}")]
    DestinationInsideSource {
        dest_root: PathBuf,
        source_dir: PathBuf,
    },

    #[error("file is not pending: {0}")]
    NotPending(PathBuf),

    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("no bibliographic lookup is configured")]
    LookupUnavailable,

    #[error("scan failed: {0}")]
    ScanFailed(String),

    #[error(transparent)]
    File(#[from] FileFailure),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Per-worker tallies, summed into a [`RunSummary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerTally {
    pub processed: u64,
    pub accepted: u64,
    pub unidentifiable: u64,
    pub duplicates: u64,
    pub copy_failures: u64,
}

impl WorkerTally {
    pub fn record<T>(&mut self, outcome: &Result<T, FileFailure>) {
        self.processed += 1;
        match outcome {
            Ok(_) => self.accepted += 1,
            Err(FileFailure::ExtractionFailure) => self.unidentifiable += 1,
            Err(FileFailure::DestinationCollision { .. }) => self.duplicates += 1,
            Err(FileFailure::CopyFailure { .. }) => self.copy_failures += 1,
        }
    }

    pub fn merge(&mut self, other: WorkerTally) {
        self.processed += other.processed;
        self.accepted += other.accepted;
        self.unidentifiable += other.unidentifiable;
        self.duplicates += other.duplicates;
        self.copy_failures += other.copy_failures;
    }
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Files found by the scan.
    pub total: u64,
    pub accepted: u64,
    pub unidentifiable: u64,
    pub duplicates: u64,
    pub copy_failures: u64,
}

/// What a status query returns.
#[derive(Debug, Clone, Serialize)]
pub struct EngineStatus {
    pub state: RunState,
    pub progress: ProgressState,
    pub pending: Vec<RejectedEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<RunSummary>,
}

/// Metadata supplied by an operator for a pending file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualMetadata {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub series_sequence: Option<String>,
    #[serde(default)]
    pub disc_number: Option<u32>,
    #[serde(default)]
    pub track_number: Option<u32>,
}

impl ManualMetadata {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Builds a record whose every field comes from the operator.
    pub fn to_record(&self) -> MetadataRecord {
        let tier = Tier::Manual;
        let mut record = MetadataRecord::new();
        record.fill(FieldValue::Title(self.title.clone()), tier);
        record.fill_opt(self.author.clone().map(FieldValue::Author), tier);
        record.fill_opt(self.series.clone().map(FieldValue::Series), tier);
        record.fill_opt(
            self.series_sequence.clone().map(FieldValue::SeriesSequence),
            tier,
        );
        record.fill_opt(self.disc_number.map(FieldValue::DiscNumber), tier);
        record.fill_opt(self.track_number.map(FieldValue::TrackNumber), tier);
        record
    }

    /// Tag fields to write into the placed copy.
    pub fn to_tag_update(&self) -> TagUpdate {
        TagUpdate {
            title: Some(self.title.trim().to_string()),
            artist: self.author.clone(),
            album: self.series.clone(),
            track: self.track_number,
            disc: self.disc_number,
        }
    }
}
