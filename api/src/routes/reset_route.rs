//! POST /reset: forgets the session's image context and history.

use std::sync::Arc;

use axum::extract::State;
use serde::Serialize;
use tracing::info;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse, sessions::SessionId};

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub session: String,
}

pub async fn reset_session(
    State(state): State<Arc<AppState>>,
    session: SessionId,
) -> ApiResponse<ResetResponse> {
    state.sessions.reset(session.as_str()).await;
    info!(session = %session.as_str(), "session reset");
    ApiResponse::success(ResetResponse { session: session.0 })
}
