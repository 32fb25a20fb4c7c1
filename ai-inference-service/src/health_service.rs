//! Health checks for inference backends.
//!
//! - KServe v2: `GET {endpoint}/v2/models/{model}/ready`
//! - Hugging Face: `GET {endpoint}/status/{model}` (best-effort `loaded` flag)
//! - Ollama: `GET {endpoint}/api/tags` (best-effort model existence check)
//!
//! [`HealthService::check`] is resilient and never fails (errors mapped to
//! `ok=false`). Provider-specific checks (`try_*`) return strict `Result`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::model_config::InferenceModelConfig;
use crate::config::provider::InferenceProvider;
use crate::error_handler::{AiInferenceError, HealthError, HttpError, make_snippet};

/// A serializable health snapshot for a single backend.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Capability this backend serves (`classifier`, `qa`, `generation`).
    pub role: String,
    pub provider: String,
    pub endpoint: String,
    pub model: String,
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the check.
    pub latency_ms: u128,
    pub message: String,
}

impl HealthStatus {
    fn new(
        role: &str,
        cfg: &InferenceModelConfig,
        ok: bool,
        latency_ms: u128,
        message: impl Into<String>,
    ) -> Self {
        Self {
            role: role.to_string(),
            provider: cfg.provider.to_string(),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// A health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
    default_timeout: Duration,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds).
    ///
    /// # Errors
    /// Returns [`AiInferenceError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiInferenceError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        info!(
            default_timeout_secs = timeout.as_secs(),
            "HealthService initialized"
        );

        Ok(Self {
            client,
            default_timeout: timeout,
        })
    }

    /// Checks one backend. Never returns an error.
    pub async fn check(&self, role: &str, cfg: &InferenceModelConfig) -> HealthStatus {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            let err = HealthError::InvalidEndpoint(format!(
                "`{}` is empty or missing http/https",
                cfg.endpoint
            ));
            warn!(role, error = %err, "health check skipped");
            return HealthStatus::new(role, cfg, false, 0, err.to_string());
        }

        let start = Instant::now();
        let result = match cfg.provider {
            InferenceProvider::Kserve => self.try_check_kserve(cfg).await,
            InferenceProvider::HuggingFace => self.try_check_huggingface(cfg).await,
            InferenceProvider::Ollama => self.try_check_ollama(cfg).await,
        };
        let latency = start.elapsed().as_millis();

        match result {
            Ok((ok, message)) => {
                info!(role, provider = %cfg.provider, ok, latency_ms = latency, "health check completed");
                HealthStatus::new(role, cfg, ok, latency, message)
            }
            Err(err) => {
                warn!(role, provider = %cfg.provider, error = %err, latency_ms = latency, "health check failed");
                HealthStatus::new(role, cfg, false, latency, err.to_string())
            }
        }
    }

    /// Checks several `(role, config)` pairs sequentially.
    pub async fn check_many(&self, targets: &[(&str, &InferenceModelConfig)]) -> Vec<HealthStatus> {
        debug!(count = targets.len(), "running batch health checks");
        let mut out = Vec::with_capacity(targets.len());
        for (role, cfg) in targets {
            out.push(self.check(role, cfg).await);
        }
        out
    }

    async fn get(
        &self,
        url: &str,
        cfg: &InferenceModelConfig,
    ) -> Result<reqwest::Response, AiInferenceError> {
        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout)
            .min(self.default_timeout);

        debug!(provider = %cfg.provider, model = %cfg.model, "GET {}", url);
        let mut req = self.client.get(url).timeout(timeout);
        if let Some(key) = cfg.api_key.as_deref() {
            req = req.header(header::AUTHORIZATION, format!("Bearer {key}"));
        }
        let resp = req.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url: url.to_string(),
                snippet: make_snippet(&text),
            })
            .into());
        }
        Ok(resp)
    }

    async fn try_check_kserve(
        &self,
        cfg: &InferenceModelConfig,
    ) -> Result<(bool, String), AiInferenceError> {
        let url = format!("{}/v2/models/{}/ready", cfg.base_url(), cfg.model);
        self.get(&url, cfg).await?;
        Ok((true, "model is ready".to_string()))
    }

    async fn try_check_huggingface(
        &self,
        cfg: &InferenceModelConfig,
    ) -> Result<(bool, String), AiInferenceError> {
        let url = format!("{}/status/{}", cfg.base_url(), cfg.model);
        let resp = self.get(&url, cfg).await?;

        #[derive(serde::Deserialize)]
        struct Status {
            loaded: Option<bool>,
            state: Option<String>,
        }

        match resp.json::<Status>().await {
            Ok(Status {
                loaded: Some(false),
                state,
            }) => Ok((
                true,
                format!(
                    "endpoint reachable; model not loaded yet ({})",
                    state.unwrap_or_else(|| "unknown".into())
                ),
            )),
            Ok(_) => Ok((true, "endpoint reachable; model available".to_string())),
            Err(e) => Ok((true, format!("endpoint reachable; failed to decode status: {e}"))),
        }
    }

    async fn try_check_ollama(
        &self,
        cfg: &InferenceModelConfig,
    ) -> Result<(bool, String), AiInferenceError> {
        let url = format!("{}/api/tags", cfg.base_url());
        let resp = self.get(&url, cfg).await?;

        // Expected minimal JSON: { "models": [ { "name": "<model>" }, ... ] }
        #[derive(serde::Deserialize)]
        struct Tag {
            name: String,
        }
        #[derive(serde::Deserialize)]
        struct Tags {
            models: Option<Vec<Tag>>,
        }

        match resp.json::<Tags>().await {
            Ok(Tags {
                models: Some(models),
            }) => {
                if models.iter().any(|m| m.name == cfg.model) {
                    Ok((true, "Ollama is healthy; model is available".to_string()))
                } else {
                    Ok((false, "Ollama is up, but model not found in /api/tags".to_string()))
                }
            }
            Ok(_) => Ok((true, "Ollama is healthy; tags response without `models` field".to_string())),
            Err(e) => Ok((true, format!("Ollama is reachable; failed to decode /api/tags: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_endpoint_is_reported_without_network() {
        let svc = HealthService::new(Some(1)).unwrap();
        let cfg = InferenceModelConfig {
            provider: InferenceProvider::Kserve,
            model: "resnet50".into(),
            endpoint: "localhost:8000".into(),
            api_key: None,
            max_tokens: None,
            timeout_secs: None,
        };
        let status = svc.check("classifier", &cfg).await;
        assert!(!status.ok);
        assert_eq!(status.role, "classifier");
        assert_eq!(status.provider, "kserve");
        assert_eq!(status.latency_ms, 0);
        assert_eq!(
            status.message,
            "[AI Inference Service] invalid endpoint: `localhost:8000` is empty or missing http/https"
        );
    }
}
