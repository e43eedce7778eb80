//! API routes for the document lifecycle

pub mod documents;
pub mod query;
pub mod upload;

use axum::{
    extract::{DefaultBodyLimit, State},
    middleware,
    routing::{delete, get, post},
    Json, Router,
};

use crate::server::auth;
use crate::server::state::AppState;
use crate::types::response::HealthResponse;

/// Build all routes. `/health` is open; everything else sits behind the
/// API key middleware.
pub fn api_routes(state: AppState) -> Router<AppState> {
    let max_upload_size = state.config().server.max_upload_size;

    let protected = Router::new()
        .route(
            "/upload",
            post(upload::upload_document).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/query", post(query::query_documents))
        .route("/documents", get(documents::list_documents))
        .route("/documents/:doc_id", delete(documents::delete_document))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_key,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected)
}

/// GET /health - liveness plus engine initialization state
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "omnirag API is running".to_string(),
        engine_initialized: state.engine().is_some(),
    })
}
