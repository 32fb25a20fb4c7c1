//! GET /health: checks every inference backend.

use std::sync::Arc;

use ai_inference_service::HealthStatus;
use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub backends: Vec<HealthStatus>,
}

/// 200 when every backend is ready, 503 otherwise.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let backends = state.health.check().await;
    let ok = backends.iter().all(|b| b.ok);
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(HealthResponse { ok, backends }))
}
