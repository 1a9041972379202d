//! Run coordinator: scan, partition, spawn workers, track lifecycle.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::pause::PauseGate;
use super::scanner::{partition, scan};
use super::types::{EngineError, EngineStatus, ManualMetadata, RunState, RunSummary, WorkerTally};
use super::worker::{run_worker, FilePipeline, SharedState};
use crate::config::{source_containing, OrganizerConfig};
use crate::lookup::BibliographicLookup;
use crate::metadata::{MetadataExtractor, MetadataRecord, SourceFile};
use crate::metrics;
use crate::placer::{FsPlacer, Placer};
use crate::progress::ProgressState;
use crate::registry::Registry;
use crate::resolver::{DestinationPath, PathResolver};
use crate::tags::{TagReader, TagWriter};

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// The organization engine.
///
/// One engine runs at most one organization pass at a time. The registry
/// and its pending set outlive runs; claimed paths and progress are reset
/// when a new run starts.
pub struct OrganizerEngine {
    config: OrganizerConfig,
    shared: Arc<SharedState>,
    gate: Arc<PauseGate>,
    tag_reader: Option<Arc<dyn TagReader>>,
    tag_writer: Option<Arc<dyn TagWriter>>,
    lookup: Option<Arc<dyn BibliographicLookup>>,
    lookup_timeout: Duration,
    placer: Arc<dyn Placer>,
    state: Arc<watch::Sender<RunState>>,
    last_run: Arc<Mutex<Option<RunSummary>>>,
    dest_root: Mutex<PathBuf>,
    start_lock: tokio::sync::Mutex<()>,
}

impl OrganizerEngine {
    /// Creates an engine with no tag or lookup capabilities and the
    /// filesystem placer.
    pub fn new(config: OrganizerConfig, registry: Arc<Registry>) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        let dest_root = config.dest_root.clone();
        Self {
            config,
            shared: Arc::new(SharedState::new(registry)),
            gate: Arc::new(PauseGate::new()),
            tag_reader: None,
            tag_writer: None,
            lookup: None,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            placer: Arc::new(FsPlacer::with_defaults()),
            state: Arc::new(state),
            last_run: Arc::new(Mutex::new(None)),
            dest_root: Mutex::new(dest_root),
            start_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_tag_reader(mut self, reader: Arc<dyn TagReader>) -> Self {
        self.tag_reader = Some(reader);
        self
    }

    pub fn with_tag_writer(mut self, writer: Arc<dyn TagWriter>) -> Self {
        self.tag_writer = Some(writer);
        self
    }

    pub fn with_lookup(mut self, lookup: Arc<dyn BibliographicLookup>, timeout: Duration) -> Self {
        self.lookup = Some(lookup);
        self.lookup_timeout = timeout;
        self
    }

    pub fn with_placer(mut self, placer: Arc<dyn Placer>) -> Self {
        self.placer = placer;
        self
    }

    pub fn config(&self) -> &OrganizerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.shared.registry
    }

    /// Starts a run in the background and returns its id.
    ///
    /// Fails without spawning anything if a run is active, the destination
    /// root sits inside a source directory, or it cannot be created.
    pub async fn start(
        &self,
        source_dirs: Vec<PathBuf>,
        dest_root: PathBuf,
    ) -> Result<String, EngineError> {
        let _guard = self.start_lock.lock().await;

        if self.state().is_active() {
            return Err(EngineError::AlreadyRunning);
        }

        if let Some(source_dir) = source_containing(&dest_root, &source_dirs) {
            return Err(EngineError::DestinationInsideSource {
                source_dir: source_dir.clone(),
                dest_root,
            });
        }

        if let Err(source) = tokio::fs::create_dir_all(&dest_root).await {
            error!(dest_root = ?dest_root, "Destination root unavailable: {}", source);
            return Err(EngineError::DestinationRootUnavailable {
                path: dest_root,
                source,
            });
        }

        let extensions = self.config.extensions.clone();
        let scan_dirs = source_dirs.clone();
        let files = tokio::task::spawn_blocking(move || scan(&scan_dirs, &extensions))
            .await
            .map_err(|e| EngineError::ScanFailed(e.to_string()))?;

        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let total = files.len() as u64;
        let shards = partition(files, self.config.workers);

        info!(
            run_id = %run_id,
            files = total,
            workers = shards.len(),
            "Starting organization run"
        );
        metrics::RUNS_STARTED.inc();

        self.shared.dedup.reset();
        self.shared.progress.reset(total, shards.len());
        *self.dest_root.lock().unwrap_or_else(|e| e.into_inner()) = dest_root.clone();
        let initial = if self.gate.is_paused() {
            RunState::Paused
        } else {
            RunState::Running
        };
        self.state.send_replace(initial);

        let pipeline = Arc::new(self.pipeline(dest_root));
        let handles: Vec<_> = shards
            .into_iter()
            .enumerate()
            .map(|(worker_id, shard)| {
                tokio::spawn(run_worker(
                    worker_id,
                    shard,
                    Arc::clone(&pipeline),
                    Arc::clone(&self.gate),
                ))
            })
            .collect();

        let state = Arc::clone(&self.state);
        let last_run = Arc::clone(&self.last_run);
        let id = run_id.clone();
        tokio::spawn(async move {
            let mut tally = WorkerTally::default();
            for result in join_all(handles).await {
                match result {
                    Ok(worker) => tally.merge(worker),
                    Err(e) => error!(run_id = %id, "Worker task failed: {}", e),
                }
            }

            let summary = RunSummary {
                run_id: id,
                started_at,
                finished_at: Utc::now(),
                total,
                accepted: tally.accepted,
                unidentifiable: tally.unidentifiable,
                duplicates: tally.duplicates,
                copy_failures: tally.copy_failures,
            };
            info!(
                run_id = %summary.run_id,
                accepted = summary.accepted,
                unidentifiable = summary.unidentifiable,
                duplicates = summary.duplicates,
                copy_failures = summary.copy_failures,
                "Organization run completed"
            );

            *last_run.lock().unwrap_or_else(|e| e.into_inner()) = Some(summary);
            state.send_replace(RunState::Completed);
        });

        Ok(run_id)
    }

    /// Blocks workers at their next file boundary.
    pub fn pause(&self) {
        self.gate.pause();
        self.state.send_if_modified(|state| {
            if *state == RunState::Running {
                *state = RunState::Paused;
                true
            } else {
                false
            }
        });
        info!("Organization paused");
    }

    pub fn resume(&self) {
        self.gate.resume();
        self.state.send_if_modified(|state| {
            if *state == RunState::Paused {
                *state = RunState::Running;
                true
            } else {
                false
            }
        });
        info!("Organization resumed");
    }

    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    pub fn progress(&self) -> ProgressState {
        self.shared.progress.snapshot()
    }

    pub fn last_run(&self) -> Option<RunSummary> {
        self.last_run
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn status(&self) -> EngineStatus {
        EngineStatus {
            state: self.state(),
            progress: self.progress(),
            pending: self.shared.registry.pending(),
            last_run: self.last_run(),
        }
    }

    /// Waits for the current run to finish. Returns `None` if no run was
    /// ever started.
    pub async fn wait(&self) -> Option<RunSummary> {
        let mut rx = self.state.subscribe();
        let _ = rx
            .wait_for(|state| matches!(state, RunState::Idle | RunState::Completed))
            .await;
        self.last_run()
    }

    /// Places a pending file using operator-supplied metadata, then writes
    /// the metadata into the copy's tags when a writer is configured.
    pub async fn resolve_manually(
        &self,
        origin: &Path,
        metadata: ManualMetadata,
    ) -> Result<DestinationPath, EngineError> {
        if metadata.title.trim().is_empty() {
            return Err(EngineError::InvalidMetadata("title is required".to_string()));
        }
        let entry = self
            .shared
            .registry
            .pending_entry(origin)
            .ok_or_else(|| EngineError::NotPending(origin.to_path_buf()))?;
        let file = SourceFile::from_path(&entry.origin)
            .ok_or_else(|| EngineError::InvalidMetadata("origin has no file name".to_string()))?;

        let record = metadata.to_record();
        let pipeline = self.pipeline(self.current_dest_root());
        let dest = pipeline.place(&file, &record).await?;
        info!(file = ?file.path, destination = ?dest.full_path(), "Resolved manually");

        if let Some(writer) = &self.tag_writer {
            let writer = Arc::clone(writer);
            let update = metadata.to_tag_update();
            let target = dest.full_path();
            let result =
                tokio::task::spawn_blocking(move || writer.write(&target, &update)).await;
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(file = ?file.path, "Failed to write tags to copy: {}", e),
                Err(e) => warn!(file = ?file.path, "Tag write task failed: {}", e),
            }
        }

        Ok(dest)
    }

    /// Runs the local tiers plus a forced catalog lookup for one file.
    pub async fn search_external(&self, origin: &Path) -> Result<MetadataRecord, EngineError> {
        let file = SourceFile::from_path(origin)
            .ok_or_else(|| EngineError::InvalidMetadata("origin has no file name".to_string()))?;
        self.extractor()
            .search_candidate(&file)
            .await
            .ok_or(EngineError::LookupUnavailable)
    }

    /// Dismisses a pending file without placing it.
    pub fn deny(&self, origin: &Path) -> Result<(), EngineError> {
        if self.shared.registry.deny(origin)? {
            info!(file = ?origin, "Denied pending file");
            Ok(())
        } else {
            Err(EngineError::NotPending(origin.to_path_buf()))
        }
    }

    fn current_dest_root(&self) -> PathBuf {
        self.dest_root
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn extractor(&self) -> MetadataExtractor {
        MetadataExtractor::new(
            self.tag_reader.clone(),
            self.lookup.clone(),
            self.lookup_timeout,
        )
    }

    fn pipeline(&self, dest_root: PathBuf) -> FilePipeline {
        FilePipeline {
            extractor: Arc::new(self.extractor()),
            resolver: Arc::new(PathResolver::from_config(&self.config)),
            placer: Arc::clone(&self.placer),
            shared: Arc::clone(&self.shared),
            dest_root,
            copy_cover_art: self.config.copy_cover_art,
            verify_checksums: self.config.verify_checksums,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryRegistryStore;
    use tempfile::TempDir;

    fn engine(temp: &TempDir) -> OrganizerEngine {
        let registry = Registry::open(Arc::new(MemoryRegistryStore::new())).unwrap();
        let config = OrganizerConfig::new(vec![temp.path().join("in")], temp.path().join("out"));
        OrganizerEngine::new(config, Arc::new(registry))
    }

    #[tokio::test]
    async fn test_wait_without_run() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        assert_eq!(engine.state(), RunState::Idle);
        assert!(engine.wait().await.is_none());
    }

    #[tokio::test]
    async fn test_empty_scan_completes() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);

        engine
            .start(vec![temp.path().join("missing")], temp.path().join("out"))
            .await
            .unwrap();
        let summary = engine.wait().await.unwrap();

        assert_eq!(summary.total, 0);
        assert_eq!(engine.state(), RunState::Completed);
        assert!(temp.path().join("out").is_dir());
    }

    #[tokio::test]
    async fn test_destination_root_unavailable() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let engine = engine(&temp);

        let result = engine.start(vec![], blocker.join("out")).await;
        assert!(matches!(
            result,
            Err(EngineError::DestinationRootUnavailable { .. })
        ));
        assert_eq!(engine.state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_destination_inside_source_is_refused() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("in");
        let dest = source.join("library");
        let engine = engine(&temp);

        let result = engine.start(vec![source], dest.clone()).await;
        assert!(matches!(
            result,
            Err(EngineError::DestinationInsideSource { .. })
        ));
        assert!(!dest.exists());
        assert_eq!(engine.state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_pause_when_idle_only_sets_gate() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        engine.pause();
        assert_eq!(engine.state(), RunState::Idle);
        engine.resume();
        assert_eq!(engine.state(), RunState::Idle);
    }

    #[tokio::test]
    async fn test_resolve_requires_title_and_pending() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);

        let result = engine
            .resolve_manually(Path::new("/in/x.mp3"), ManualMetadata::new("  "))
            .await;
        assert!(matches!(result, Err(EngineError::InvalidMetadata(_))));

        let result = engine
            .resolve_manually(Path::new("/in/x.mp3"), ManualMetadata::new("T"))
            .await;
        assert!(matches!(result, Err(EngineError::NotPending(_))));
    }

    #[tokio::test]
    async fn test_search_external_without_lookup() {
        let temp = TempDir::new().unwrap();
        let engine = engine(&temp);
        let result = engine.search_external(Path::new("/in/x.mp3")).await;
        assert!(matches!(result, Err(EngineError::LookupUnavailable)));
    }
}
