//! CSV downloads of the accepted and rejected logs.

use std::sync::Arc;

use audioshelf_core::RegistryError;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use super::handlers::ErrorResponse;
use crate::state::AppState;

pub async fn rejected_csv(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    csv_download("rejected.csv", state.engine().registry().rejected_csv())
}

pub async fn accepted_csv(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    csv_download("accepted.csv", state.engine().registry().accepted_csv())
}

fn csv_download(
    file_name: &str,
    body: Result<Vec<u8>, RegistryError>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let body = body.map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(e.to_string())),
        )
    })?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    ))
}
