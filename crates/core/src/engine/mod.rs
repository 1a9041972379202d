//! The organization engine.
//!
//! A run scans the source directories, splits the files into fixed shards
//! and gives each shard to one worker task. Workers share only the progress
//! tracker, the dedup guard and the registry.

mod coordinator;
mod cover;
mod pause;
mod scanner;
mod types;
mod worker;

pub use coordinator::OrganizerEngine;
pub use cover::{locate_cover_art, COVER_FILE_NAME};
pub use pause::PauseGate;
pub use scanner::{partition, scan};
pub use types::{
    EngineError, EngineStatus, FileFailure, ManualMetadata, RunState, RunSummary, WorkerTally,
};
pub use worker::{FilePipeline, SharedState};
