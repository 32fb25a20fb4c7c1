use std::{str::FromStr, time::Duration};

use crate::{config::provider::InferenceProvider, error_handler::ConfigError};

/// Connection settings shared by every inference client.
///
/// # Fields
///
/// - `provider`: which backend protocol to speak.
/// - `model`: model identifier (`"resnet50"`, `"deepset/roberta-base-squad2"`).
/// - `endpoint`: base URL of the inference server.
/// - `api_key`: optional bearer token (Hugging Face).
/// - `max_tokens`: cap on generated tokens, text generation only.
/// - `timeout_secs`: optional request timeout in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceModelConfig {
    pub provider: InferenceProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl InferenceModelConfig {
    /// Endpoint without trailing slashes, ready for path joining.
    pub fn base_url(&self) -> &str {
        self.endpoint.trim().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(60))
    }
}

/// How to interpret the classifier's output tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierOutput {
    /// Raw scores; softmax is applied client-side.
    Logits,
    /// Already a probability distribution.
    Probabilities,
}

impl FromStr for ClassifierOutput {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logits" => Ok(ClassifierOutput::Logits),
            "probabilities" | "probs" | "softmax" => Ok(ClassifierOutput::Probabilities),
            _ => Err(ConfigError::InvalidFormat {
                var: "CLASSIFIER_OUTPUT",
                reason: "expected `logits` or `probabilities`",
            }),
        }
    }
}

/// Image classifier settings on top of [`InferenceModelConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub model: InferenceModelConfig,
    /// Name of the input tensor in the served model.
    pub input_name: String,
    /// Output tensor to read; first output when `None`.
    pub output_name: Option<String>,
    /// Square side the image is resized to.
    pub input_size: u32,
    pub output: ClassifierOutput,
}
