use std::{future::Future, path::PathBuf, pin::Pin, sync::Arc, time::Duration};

use ai_inference_service::{
    AiInferenceError, HealthStatus, InferenceProfiles,
    error_handler::{env_opt, env_or, validate_range_f32},
};
use services::uploads::{NamingPolicy, UploadError, UploadStore};
use thiserror::Error;
use tracing::info;
use vision_chat::{
    AnswerOrchestrator, ImageAnalyzer, LabelStore, LabelStoreError, SamplingProfile,
    orchestrator::DEFAULT_QA_THRESHOLD,
};

use crate::core::sessions::{DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_IDLE, SessionRegistry};

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:5000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Startup failures. The server never starts with a partial state.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load labels: {0}")]
    Labels(#[from] LabelStoreError),

    #[error(transparent)]
    Inference(#[from] AiInferenceError),

    #[error("failed to prepare upload directory: {0}")]
    Upload(#[from] UploadError),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Server settings read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub address: String,
    pub labels_path: PathBuf,
    pub upload_dir: PathBuf,
    pub upload_naming: NamingPolicy,
    pub max_upload_bytes: usize,
    pub qa_threshold: f32,
    pub max_sessions: usize,
    pub session_idle: Duration,
}

impl AppConfig {
    /// Load settings; unset variables take their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let upload_naming = env_or("UPLOAD_NAMING", "original").parse::<NamingPolicy>()?;

        let max_upload_bytes = match env_opt("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.parse::<usize>().map_err(|e| ConfigError::Invalid {
                var: "MAX_UPLOAD_BYTES",
                reason: e.to_string(),
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let qa_threshold = match env_opt("QA_THRESHOLD") {
            Some(raw) => raw.parse::<f32>().map_err(|e| ConfigError::Invalid {
                var: "QA_THRESHOLD",
                reason: e.to_string(),
            })?,
            None => DEFAULT_QA_THRESHOLD,
        };
        validate_range_f32("QA_THRESHOLD", qa_threshold, 0.0, 1.0)?;

        let max_sessions = match env_opt("MAX_SESSIONS") {
            Some(raw) => parse_positive("MAX_SESSIONS", &raw)?,
            None => DEFAULT_MAX_SESSIONS,
        };
        let session_idle = match env_opt("SESSION_IDLE_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("SESSION_IDLE_SECS", &raw)? as u64),
            None => DEFAULT_SESSION_IDLE,
        };

        Ok(Self {
            address: env_or("API_ADDRESS", DEFAULT_ADDRESS),
            labels_path: PathBuf::from(env_or("LABELS_PATH", "classes.txt")),
            upload_dir: PathBuf::from(env_or("UPLOAD_DIR", "uploads")),
            upload_naming,
            max_upload_bytes,
            qa_threshold,
            max_sessions,
            session_idle,
        })
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::Invalid {
            var,
            reason: "must be greater than zero".into(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

/// Readiness of the inference backends, reported by `GET /health`.
pub trait BackendHealth: Send + Sync {
    fn check(&self) -> Pin<Box<dyn Future<Output = Vec<HealthStatus>> + Send + '_>>;
}

impl BackendHealth for InferenceProfiles {
    fn check(&self) -> Pin<Box<dyn Future<Output = Vec<HealthStatus>> + Send + '_>> {
        Box::pin(self.health_all())
    }
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    /// Classifier plus labels; turns uploaded bytes into a description.
    pub analyzer: ImageAnalyzer,
    /// QA with generative fallback.
    pub orchestrator: AnswerOrchestrator,
    /// One conversation per `X-Session-Id`.
    pub sessions: SessionRegistry,
    pub uploads: UploadStore,
    pub health: Arc<dyn BackendHealth>,
}

impl AppState {
    pub fn new(
        analyzer: ImageAnalyzer,
        orchestrator: AnswerOrchestrator,
        uploads: UploadStore,
        health: Arc<dyn BackendHealth>,
    ) -> Self {
        Self {
            analyzer,
            orchestrator,
            sessions: SessionRegistry::default(),
            uploads,
            health,
        }
    }

    /// Replaces the default session bounds.
    pub fn with_sessions(mut self, sessions: SessionRegistry) -> Self {
        self.sessions = sessions;
        self
    }

    /// Builds every component once: labels, inference clients, upload dir.
    pub async fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let labels = Arc::new(LabelStore::load(&config.labels_path)?);
        info!(
            path = %config.labels_path.display(),
            classes = labels.len(),
            "labels loaded"
        );

        let profiles = Arc::new(InferenceProfiles::from_env()?);

        let analyzer = ImageAnalyzer::new(profiles.classifier(), labels);
        let orchestrator = AnswerOrchestrator::new(profiles.qa(), profiles.generator())
            .with_profile(
                SamplingProfile::conversational().with_max_new_tokens(profiles.max_new_tokens()),
            )
            .with_qa_threshold(config.qa_threshold);

        let uploads = UploadStore::new(config.upload_dir.clone(), config.upload_naming).await?;

        Ok(Self::new(analyzer, orchestrator, uploads, profiles)
            .with_sessions(SessionRegistry::new(config.max_sessions, config.session_idle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_bounds_must_be_positive() {
        assert_eq!(parse_positive("MAX_SESSIONS", " 64 ").unwrap(), 64);
        assert!(matches!(
            parse_positive("MAX_SESSIONS", "0"),
            Err(ConfigError::Invalid { var: "MAX_SESSIONS", .. })
        ));
        assert!(parse_positive("SESSION_IDLE_SECS", "soon").is_err());
    }
}
