//! POST /upload: stores an image, analyzes it and resets the session's context.

use std::sync::Arc;

use axum::extract::{Multipart, State, multipart::MultipartRejection};
use tracing::{info, instrument, warn};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse, sessions::SessionId},
    error_handler::{AppError, AppResult},
    routes::upload::upload_response::{UPLOAD_MESSAGE, UploadResponse},
};

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Handler: POST /upload
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:5000/upload \
///   -H 'X-Session-Id: alice' \
///   -F image=@dog.jpg
/// ```
#[instrument(skip_all, fields(session = %session.as_str()))]
pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    session: SessionId,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<ApiResponse<UploadResponse>> {
    let mut multipart = multipart?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().trim().to_string();
        let bytes = field.bytes().await?;
        image = Some((file_name, bytes));
        break;
    }

    let Some((file_name, bytes)) = image else {
        return Err(AppError::BadRequest("No image file provided".into()));
    };
    if file_name.is_empty() {
        return Err(AppError::BadRequest("No selected file".into()));
    }
    if bytes.is_empty() {
        return Err(AppError::BadRequest("Uploaded image is empty".into()));
    }

    let path = state.uploads.save(&file_name, &bytes).await?;
    let analysis = state.analyzer.analyze(&bytes).await;
    if let Err(err) = state.uploads.release(&path).await {
        warn!(error = %err, "failed to remove temporary upload");
    }
    let analysis = analysis?;

    let conversation = state.sessions.session(session.as_str()).await;
    conversation
        .lock()
        .await
        .set_context(analysis.description.clone());

    info!(
        path = %path.display(),
        predictions = analysis.predictions.len(),
        "image analyzed; conversation context replaced"
    );

    Ok(ApiResponse::success(UploadResponse {
        analysis,
        message: UPLOAD_MESSAGE,
    }))
}
