use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::build::BuildCoordinator;
use crate::index::InvertedIndex;
use crate::metrics::EngineMetrics;
use crate::search::QueryService;

use super::handlers;

/// Application state shared across all handlers
pub struct AppState {
    pub index: Arc<InvertedIndex>,
    pub query: QueryService,
    pub coordinator: Arc<BuildCoordinator>,
    pub metrics: EngineMetrics,
}

/// Create the HTTP router. The `web_root` directory backs the static UI and
/// is served for any path no API route claims.
pub fn create_router(state: AppState, web_root: impl Into<PathBuf>) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/search", get(handlers::search))
        .route("/build", post(handlers::build))
        .route("/scheduler", post(handlers::scheduler))
        .route("/status", get(handlers::status))
        .route("/metrics", get(handlers::metrics))
        .fallback_service(ServeDir::new(web_root.into()))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
