//! Manual resolution handlers for files the engine could not identify.

use std::path::PathBuf;
use std::sync::Arc;

use audioshelf_core::{ManualMetadata, MetadataRecord, RejectedEntry};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use super::organizer::engine_error;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PendingResponse {
    pub pending: Vec<RejectedEntry>,
    pub total: usize,
}

/// Operator-supplied metadata for one pending file.
#[derive(Debug, Deserialize)]
pub struct ResolveBody {
    pub origin: PathBuf,
    #[serde(flatten)]
    pub metadata: ManualMetadata,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub origin: PathBuf,
    pub destination: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OriginBody {
    pub origin: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub origin: PathBuf,
    pub candidate: MetadataRecord,
}

/// List files waiting for resolution
pub async fn list_pending(State(state): State<Arc<AppState>>) -> Json<PendingResponse> {
    let pending = state.engine().registry().pending();
    Json(PendingResponse {
        total: pending.len(),
        pending,
    })
}

/// Place a pending file using operator metadata
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResolveBody>,
) -> Result<Json<ResolveResponse>, impl IntoResponse> {
    match state
        .engine()
        .resolve_manually(&body.origin, body.metadata)
        .await
    {
        Ok(dest) => Ok(Json(ResolveResponse {
            origin: body.origin,
            destination: dest.full_path(),
        })),
        Err(e) => Err(engine_error(e)),
    }
}

/// Ask the catalog for a candidate record for a pending file
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OriginBody>,
) -> Result<Json<SearchResponse>, impl IntoResponse> {
    match state.engine().search_external(&body.origin).await {
        Ok(candidate) => Ok(Json(SearchResponse {
            origin: body.origin,
            candidate,
        })),
        Err(e) => Err(engine_error(e)),
    }
}

/// Dismiss a pending file
pub async fn deny(
    State(state): State<Arc<AppState>>,
    Json(body): Json<OriginBody>,
) -> Result<StatusCode, impl IntoResponse> {
    match state.engine().deny(&body.origin) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err(engine_error(e)),
    }
}
