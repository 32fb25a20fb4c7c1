//! POST /ask: answers a question about the session's current image.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::instrument;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse, sessions::SessionId},
    error_handler::{AppError, AppResult},
    routes::ask::ask_request::{AskRequest, AskResponse},
};

/// Handler: POST /ask
///
/// Without a prior upload the answer asks the caller to upload an image;
/// that is still a 200.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:5000/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What color is it?"}'
/// ```
#[instrument(skip_all, fields(session = %session.as_str()))]
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> AppResult<ApiResponse<AskResponse>> {
    let Json(AskRequest { question }) = body?;
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::BadRequest("No question provided".into()));
    }

    let conversation = state.sessions.session(session.as_str()).await;
    let mut conversation = conversation.lock().await;
    let answer = state.orchestrator.answer(question, &mut conversation).await;

    Ok(ApiResponse::success(AskResponse { answer }))
}
