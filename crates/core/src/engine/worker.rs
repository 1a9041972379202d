//! The per-file pipeline and the worker loop that drives it.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::cover;
use super::pause::PauseGate;
use super::types::{FileFailure, WorkerTally};
use crate::dedup::{ClaimOutcome, DedupGuard};
use crate::metadata::{MetadataExtractor, MetadataRecord, SourceFile};
use crate::metrics;
use crate::placer::{FilePlacement, Placer, PlacerError};
use crate::progress::ProgressTracker;
use crate::registry::{AcceptedEntry, Registry, RejectReason};
use crate::resolver::{DestinationPath, PathResolver};

/// Cross-worker mutable state. Each part synchronizes itself.
pub struct SharedState {
    pub progress: ProgressTracker,
    pub dedup: DedupGuard,
    pub registry: Arc<Registry>,
}

impl SharedState {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            progress: ProgressTracker::new(),
            dedup: DedupGuard::new(),
            registry,
        }
    }
}

/// Extract, resolve, claim, copy and record one file.
pub struct FilePipeline {
    pub(crate) extractor: Arc<MetadataExtractor>,
    pub(crate) resolver: Arc<PathResolver>,
    pub(crate) placer: Arc<dyn Placer>,
    pub(crate) shared: Arc<SharedState>,
    pub(crate) dest_root: PathBuf,
    pub(crate) copy_cover_art: bool,
    pub(crate) verify_checksums: bool,
}

impl FilePipeline {
    /// Runs the whole pipeline and records the outcome in the registry.
    pub async fn handle(&self, file: &SourceFile) -> Result<DestinationPath, FileFailure> {
        let record = self.extractor.extract(file).await;
        let outcome = self.place(file, &record).await;
        self.record_outcome(file, &outcome);
        outcome
    }

    /// Resolves and copies a file whose metadata is already known.
    ///
    /// On success the file is logged as accepted, which also drops it from
    /// the pending set.
    pub async fn place(
        &self,
        file: &SourceFile,
        record: &MetadataRecord,
    ) -> Result<DestinationPath, FileFailure> {
        let dest = self
            .resolver
            .resolve(record, &file.file_name, &self.dest_root)
            .ok_or(FileFailure::ExtractionFailure)?;
        let target = dest.full_path();

        if let ClaimOutcome::Rejected { existing_origin } =
            self.shared.dedup.claim(&target, &file.path)
        {
            return Err(FileFailure::DestinationCollision {
                destination: target,
                existing_origin: Some(existing_origin),
            });
        }

        let placement =
            FilePlacement::new(&file.path, &target).with_checksum(self.verify_checksums);
        match self.placer.place(placement).await {
            Ok(placed) => metrics::BYTES_COPIED.inc_by(placed.size_bytes),
            Err(PlacerError::DestinationExists { .. }) => {
                // Left by an earlier run; keep the claim so later files in
                // this run see the collision too
                return Err(FileFailure::DestinationCollision {
                    destination: target,
                    existing_origin: None,
                });
            }
            Err(e) => {
                self.shared.dedup.release(&target, &file.path);
                return Err(FileFailure::CopyFailure {
                    destination: target,
                    message: e.to_string(),
                });
            }
        }

        if self.copy_cover_art {
            let title = record.title.as_deref().unwrap_or_default();
            cover::copy_cover_art(self.placer.as_ref(), &file.containing_folder, title, &dest)
                .await;
        }

        if let Some(entry) = AcceptedEntry::from_record(&file.path, record) {
            if let Err(e) = self.shared.registry.accept(entry) {
                error!(file = ?file.path, "Failed to log accepted file: {}", e);
            }
        }

        Ok(dest)
    }

    fn record_outcome(&self, file: &SourceFile, outcome: &Result<DestinationPath, FileFailure>) {
        let label = match outcome {
            Ok(_) => "accepted",
            Err(failure) => failure.outcome_label(),
        };
        metrics::FILES_PROCESSED.with_label_values(&[label]).inc();

        let reason = match outcome {
            Ok(dest) => {
                debug!(file = ?file.path, destination = ?dest.full_path(), "Placed file");
                return;
            }
            Err(FileFailure::ExtractionFailure) => {
                debug!(file = ?file.path, "No title resolved");
                RejectReason::Unidentifiable
            }
            Err(failure @ FileFailure::DestinationCollision { .. }) => {
                debug!(file = ?file.path, "Rejected: {}", failure);
                RejectReason::Duplicate
            }
            Err(failure @ FileFailure::CopyFailure { .. }) => {
                warn!(file = ?file.path, "Leaving file in place: {}", failure);
                return;
            }
        };

        if let Err(e) = self
            .shared
            .registry
            .reject(&file.path, &file.file_name, reason)
        {
            error!(file = ?file.path, "Failed to log rejected file: {}", e);
        }
    }
}

/// Processes one shard in order, checking the pause gate before each file.
pub async fn run_worker(
    worker_id: usize,
    shard: Vec<SourceFile>,
    pipeline: Arc<FilePipeline>,
    gate: Arc<PauseGate>,
) -> WorkerTally {
    let mut tally = WorkerTally::default();
    debug!(worker = worker_id, files = shard.len(), "Worker started");

    for file in shard {
        gate.wait_until_resumed().await;

        let progress = &pipeline.shared.progress;
        progress.set_current_folder(worker_id, &file.containing_folder);
        let outcome = pipeline.handle(&file).await;
        tally.record(&outcome);
        progress.advance(worker_id);
    }

    info!(
        worker = worker_id,
        processed = tally.processed,
        accepted = tally.accepted,
        "Worker finished"
    );
    tally
}
