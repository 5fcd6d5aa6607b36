use crate::app::state::AppState;
use crate::handler::health::health_handler;
use crate::handler::index::index_handler;
use crate::handler::upload::upload_handler;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Headroom above the file limit for multipart boundaries and headers.
const MULTIPART_OVERHEAD: usize = 16 * 1024;

/// Build the HTTP router (upload page, upload endpoint, health).
pub fn router(state: AppState) -> Router {
    let body_limit = state.uploads.max_bytes().saturating_add(MULTIPART_OVERHEAD);

    let upload_router = Router::new()
        .route("/uploadfile", post(upload_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Router::new()
        .route("/", get(index_handler))
        .route("/v1/health", get(health_handler))
        .merge(upload_router)
        .layer(TraceLayer::new_for_http())
}
