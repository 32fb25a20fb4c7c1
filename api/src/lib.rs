//! HTTP surface of the vision-chat backend.
//!
//! | Route          | Purpose                                        |
//! |----------------|------------------------------------------------|
//! | `POST /upload` | multipart `image` → predictions + description   |
//! | `POST /ask`    | `{"question"}` → answer about the current image |
//! | `POST /reset`  | forget the session's image and history          |
//! | `GET /health`  | readiness of the inference backends             |
//!
//! Conversations are keyed by the optional `X-Session-Id` header.

use std::sync::Arc;

pub mod core;
pub mod error_handler;
mod routes;

#[cfg(test)]
mod testing;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    core::app_state::{AppConfig, AppState},
    error_handler::AppError,
    routes::{
        ask::ask_route::ask_question, health_route::health, reset_route::reset_session,
        upload::upload_route::upload_image,
    },
};

/// Loads configuration, builds shared state and serves until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let state = Arc::new(AppState::from_config(&config).await?);
    let app = router(state, config.max_upload_bytes);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&config.address)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %config.address, "vision-chat API listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// All routes with body limit, CORS and request tracing applied.
pub fn router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/upload", post(upload_image))
        .route("/ask", post(ask_question))
        .route("/reset", post(reset_session))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        // Without a signal handler the server runs until the process is killed.
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
