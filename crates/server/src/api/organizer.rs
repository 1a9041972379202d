//! Run control and progress handlers.

use std::path::PathBuf;
use std::sync::Arc;

use audioshelf_core::{EngineError, RejectedEntry, RunState, RunSummary};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use super::handlers::ErrorResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Optional overrides for a run; missing fields fall back to config.
#[derive(Debug, Default, Deserialize)]
pub struct StartRunBody {
    pub source_dirs: Option<Vec<PathBuf>>,
    pub dest_root: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct StartRunResponse {
    pub run_id: String,
    pub state: RunState,
}

#[derive(Debug, Serialize)]
pub struct RunStateResponse {
    pub state: RunState,
}

/// One worker's row in the progress view.
#[derive(Debug, Serialize)]
pub struct WorkerProgressResponse {
    pub worker_id: usize,
    pub processed: u64,
    pub current_folder: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub state: RunState,
    pub workers: Vec<WorkerProgressResponse>,
    pub total_files: u64,
    pub processed: u64,
    pub pending: Vec<RejectedEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<RunSummary>,
}

/// Maps engine errors to HTTP status codes.
pub(crate) fn engine_error(e: EngineError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        EngineError::AlreadyRunning => StatusCode::CONFLICT,
        EngineError::DestinationInsideSource { .. } => StatusCode::BAD_REQUEST,
        EngineError::NotPending(_) => StatusCode::NOT_FOUND,
        EngineError::InvalidMetadata(_) => StatusCode::BAD_REQUEST,
        EngineError::LookupUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::File(_) => StatusCode::CONFLICT,
        EngineError::DestinationRootUnavailable { .. }
        | EngineError::ScanFailed(_)
        | EngineError::Registry(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse::new(e.to_string())))
}

// ============================================================================
// Handlers
// ============================================================================

/// Start an organization run
pub async fn start(
    State(state): State<Arc<AppState>>,
    body: Option<Json<StartRunBody>>,
) -> Result<(StatusCode, Json<StartRunResponse>), impl IntoResponse> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let organizer = &state.config().organizer;
    let source_dirs = body
        .source_dirs
        .unwrap_or_else(|| organizer.source_dirs.clone());
    let dest_root = body.dest_root.unwrap_or_else(|| organizer.dest_root.clone());

    if source_dirs.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("no source directories given")),
        ));
    }

    let engine = state.engine();
    match engine.start(source_dirs, dest_root).await {
        Ok(run_id) => Ok((
            StatusCode::ACCEPTED,
            Json(StartRunResponse {
                run_id,
                state: engine.state(),
            }),
        )),
        Err(e) => Err(engine_error(e)),
    }
}

/// Pause the current run
pub async fn pause(State(state): State<Arc<AppState>>) -> Json<RunStateResponse> {
    state.engine().pause();
    Json(RunStateResponse {
        state: state.engine().state(),
    })
}

/// Resume a paused run
pub async fn resume(State(state): State<Arc<AppState>>) -> Json<RunStateResponse> {
    state.engine().resume();
    Json(RunStateResponse {
        state: state.engine().state(),
    })
}

/// Current run state, per-worker progress and the pending list
pub async fn progress(State(state): State<Arc<AppState>>) -> Json<ProgressResponse> {
    let status = state.engine().status();
    let processed = status.progress.processed();
    let workers = status
        .progress
        .workers
        .into_iter()
        .map(|(worker_id, w)| WorkerProgressResponse {
            worker_id,
            processed: w.processed,
            current_folder: w.current_folder,
        })
        .collect();

    Json(ProgressResponse {
        state: status.state,
        workers,
        total_files: status.progress.total_files,
        processed,
        pending: status.pending,
        last_run: status.last_run,
    })
}
