use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::handlers::{get_available_ranges, health_check, process_edf};
use crate::state::ServerState;

pub fn create_router(state: Arc<ServerState>) -> Router {
    let max_upload_size = state.config.max_upload_size;

    Router::new()
        .route("/health", get(health_check))
        .route("/ranges", post(get_available_ranges))
        .route("/process", post(process_edf))
        .fallback(handle_404)
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(RequestBodyLimitLayer::new(max_upload_size))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config))
        .with_state(state)
}

/// CORS for the UI, which runs on its own port. The download name is read
/// from `Content-Disposition`, so that header is exposed.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .expose_headers([header::CONTENT_DISPOSITION]);

    if config.allows_any_origin() {
        return cors.allow_origin(Any).allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();
    cors.allow_origin(origins)
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}

async fn handle_404() -> (StatusCode, Json<serde_json::Value>) {
    tracing::warn!("404 - Endpoint not found");
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "detail": "Not Found" })),
    )
}
