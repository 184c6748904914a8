use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::state::ServerState;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model: ModelStatus,
    pub uptime_seconds: u64,
}

/// Whether the checkpoint loaded at start-up is usable
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelStatus {
    pub ready: bool,
    pub model_type: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Health check endpoint
pub async fn health_check(
    State(state): State<Arc<ServerState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let error = state.model_error().map(str::to_string);
    let response = HealthResponse {
        status: if error.is_none() { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: ModelStatus {
            ready: error.is_none(),
            model_type: state.config.model_type.to_string(),
            path: state.config.model_path.display().to_string(),
            error,
        },
        uptime_seconds: state.uptime_seconds(),
    };

    (StatusCode::OK, Json(response))
}
