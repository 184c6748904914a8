pub mod config;
pub mod page;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use config::UiConfig;
pub use page::PageRenderer;

/// State shared by the UI handlers
pub struct UiState {
    pub config: UiConfig,
    pub page: PageRenderer,
}

impl UiState {
    pub fn new(config: UiConfig) -> anyhow::Result<Self> {
        Ok(Self {
            config,
            page: PageRenderer::new()?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend_url: String,
}

pub fn create_router(state: Arc<UiState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(State(state): State<Arc<UiState>>) -> Response {
    match state.page.render_index(&state.config) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("{}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
        }
    }
}

async fn health_check(State(state): State<Arc<UiState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend_url: state.config.backend_url.clone(),
    })
}
