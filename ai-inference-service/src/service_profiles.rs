//! The three inference capabilities bundled for startup wiring.
//!
//! - Construct once, wrap in `Arc`, and hand the capability handles to the
//!   analyzer and the orchestrator.
//! - Each client owns its own HTTP client (timeouts differ per backend).
//!
//! # Example
//! ```no_run
//! use ai_inference_service::service_profiles::InferenceProfiles;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let profiles = InferenceProfiles::from_env()?;
//! for status in profiles.health_all().await {
//!     println!("{} ok={}", status.role, status.ok);
//! }
//! # Ok(()) }
//! ```

use std::sync::Arc;

use tracing::info;
use vision_chat::{ExtractiveQa, ImageClassifier, TextGenerator};

use crate::{
    config::{
        default_config::{config_classifier, config_generation, config_qa},
        model_config::{ClassifierConfig, InferenceModelConfig},
    },
    error_handler::AiInferenceError,
    health_service::{HealthService, HealthStatus},
    services::{
        classifier_service::KserveClassifier, generation_service::TextGenerationService,
        qa_service::HfQuestionAnswering,
    },
};

pub struct InferenceProfiles {
    classifier: Arc<KserveClassifier>,
    qa: Arc<HfQuestionAnswering>,
    generator: Arc<TextGenerationService>,
    health: HealthService,
}

impl InferenceProfiles {
    /// Builds every client from explicit configs.
    pub fn new(
        classifier: ClassifierConfig,
        qa: InferenceModelConfig,
        generation: InferenceModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiInferenceError> {
        info!(
            classifier = %classifier.model.model,
            qa = %qa.model,
            generation = %generation.model,
            generation_provider = %generation.provider,
            "initializing inference clients"
        );
        Ok(Self {
            classifier: Arc::new(KserveClassifier::new(classifier)?),
            qa: Arc::new(HfQuestionAnswering::new(qa)?),
            generator: Arc::new(TextGenerationService::new(generation)?),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Builds every client from environment variables (see [`crate::config::default_config`]).
    pub fn from_env() -> Result<Self, AiInferenceError> {
        Self::new(config_classifier()?, config_qa()?, config_generation()?, Some(10))
    }

    pub fn classifier(&self) -> Arc<dyn ImageClassifier> {
        self.classifier.clone()
    }

    pub fn qa(&self) -> Arc<dyn ExtractiveQa> {
        self.qa.clone()
    }

    pub fn generator(&self) -> Arc<dyn TextGenerator> {
        self.generator.clone()
    }

    /// Configured cap on generated tokens, if any.
    pub fn max_new_tokens(&self) -> Option<u32> {
        self.generator.config().max_tokens
    }

    /// Checks every backend.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let targets = [
            ("classifier", &self.classifier.config().model),
            ("qa", self.qa.config()),
            ("generation", self.generator.config()),
        ];
        self.health.check_many(&targets).await
    }
}
