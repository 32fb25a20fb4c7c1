//! HTTP clients for the individual inference backends.

pub mod classifier_service;
pub mod generation_service;
pub mod preprocess;
pub mod qa_service;

use reqwest::header;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::model_config::InferenceModelConfig,
    error_handler::{AiInferenceError, HttpError, Result, make_snippet},
};

/// Builds the shared reqwest client for one backend config.
pub(crate) fn build_client(cfg: &InferenceModelConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(cfg.timeout())
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .build()?;
    Ok(client)
}

/// POSTs `body` as JSON and decodes a JSON response.
///
/// Non-2xx responses become [`AiInferenceError::HttpStatus`] with a short
/// body snippet; undecodable payloads become [`AiInferenceError::Decode`].
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    url: &str,
    api_key: Option<&str>,
    body: &B,
) -> Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    debug!("POST {}", url);
    let mut req = client.post(url).json(body);
    if let Some(key) = api_key {
        req = req.header(header::AUTHORIZATION, format!("Bearer {key}"));
    }

    let resp = req.send().await?;
    if !resp.status().is_success() {
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        return Err(AiInferenceError::HttpStatus(HttpError {
            status,
            url: url.to_string(),
            snippet: make_snippet(&text),
        }));
    }

    let text = resp.text().await?;
    serde_json::from_str::<R>(&text).map_err(|e| {
        AiInferenceError::Decode(format!("serde error: {e}; body: {}", make_snippet(&text)))
    })
}
