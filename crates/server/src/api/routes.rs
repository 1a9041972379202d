use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::{handlers, middleware::metrics_middleware, organizer, pending, registry};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Run control
        .route("/organize/start", post(organizer::start))
        .route("/organize/pause", post(organizer::pause))
        .route("/organize/resume", post(organizer::resume))
        .route("/progress", get(organizer::progress))
        // Manual resolution
        .route("/pending", get(pending::list_pending))
        .route("/pending/resolve", post(pending::resolve))
        .route("/pending/search", post(pending::search))
        .route("/pending/deny", post(pending::deny))
        // Registry downloads
        .route("/registry/rejected.csv", get(registry::rejected_csv))
        .route("/registry/accepted.csv", get(registry::accepted_csv))
        .route_layer(middleware::from_fn(metrics_middleware))
        .with_state(Arc::clone(&state));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
