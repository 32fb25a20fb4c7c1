//! Default inference configs loaded from environment variables.
//!
//! One constructor per capability:
//!
//! - **Classifier** → KServe v2 / Triton image model
//! - **QA**         → extractive question answering (Hugging Face)
//! - **Generation** → conversational text continuation (Hugging Face or Ollama)
//!
//! # Environment variables
//!
//! Common:
//! - `HF_API_TOKEN`           = optional bearer token for Hugging Face endpoints
//! - `INFERENCE_TIMEOUT_SECS` = optional request timeout (u64, default 60)
//!
//! Classifier:
//! - `CLASSIFIER_URL` (mandatory), `CLASSIFIER_MODEL`, `CLASSIFIER_INPUT`,
//!   `CLASSIFIER_OUTPUT_NAME`, `CLASSIFIER_OUTPUT`, `CLASSIFIER_INPUT_SIZE`
//!
//! QA:
//! - `QA_URL`, `QA_MODEL`
//!
//! Generation:
//! - `GEN_PROVIDER` (`huggingface` | `ollama`), `GEN_URL`, `GEN_MODEL`,
//!   `GEN_MAX_NEW_TOKENS`; for Ollama `OLLAMA_URL` or `OLLAMA_PORT` are
//!   honoured when `GEN_URL` is unset.

use crate::{
    config::{
        model_config::{ClassifierConfig, ClassifierOutput, InferenceModelConfig},
        provider::InferenceProvider,
    },
    error_handler::{
        AiInferenceError, ConfigError, env_opt, env_opt_u32, env_opt_u64, env_or, must_env,
        validate_http_endpoint,
    },
};

pub const DEFAULT_HF_ENDPOINT: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_QA_MODEL: &str = "deepset/roberta-base-squad2";
pub const DEFAULT_GEN_MODEL: &str = "microsoft/DialoGPT-medium";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "resnet50";
pub const DEFAULT_INPUT_SIZE: u32 = 224;
/// Largest accepted `CLASSIFIER_INPUT_SIZE`.
pub const MAX_INPUT_SIZE: u32 = 4096;

/// Constructs the image classifier config.
///
/// # Env
/// - `CLASSIFIER_URL` (required)
/// - `CLASSIFIER_MODEL` (default `resnet50`)
/// - `CLASSIFIER_INPUT` (default `input`)
/// - `CLASSIFIER_OUTPUT_NAME` (optional, first output otherwise)
/// - `CLASSIFIER_OUTPUT` (default `logits`)
/// - `CLASSIFIER_INPUT_SIZE` (default 224)
pub fn config_classifier() -> Result<ClassifierConfig, AiInferenceError> {
    let endpoint = must_env("CLASSIFIER_URL")?;
    validate_http_endpoint("CLASSIFIER_URL", &endpoint)?;

    let output = match env_opt("CLASSIFIER_OUTPUT") {
        Some(v) => v.parse::<ClassifierOutput>()?,
        None => ClassifierOutput::Logits,
    };
    let input_size = env_opt_u32("CLASSIFIER_INPUT_SIZE")?.unwrap_or(DEFAULT_INPUT_SIZE);
    validate_input_size(input_size)?;

    Ok(ClassifierConfig {
        model: InferenceModelConfig {
            provider: InferenceProvider::Kserve,
            model: non_empty_model(env_or("CLASSIFIER_MODEL", DEFAULT_CLASSIFIER_MODEL))?,
            endpoint,
            api_key: None,
            max_tokens: None,
            timeout_secs: timeout_secs()?,
        },
        input_name: env_or("CLASSIFIER_INPUT", "input"),
        output_name: env_opt("CLASSIFIER_OUTPUT_NAME"),
        input_size,
        output,
    })
}

fn validate_input_size(size: u32) -> Result<(), ConfigError> {
    if (1..=MAX_INPUT_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: "CLASSIFIER_INPUT_SIZE",
            detail: "expected a size between 1 and 4096",
        })
    }
}

/// Constructs the extractive QA config.
///
/// # Env
/// - `QA_URL` (default Hugging Face inference API)
/// - `QA_MODEL` (default `deepset/roberta-base-squad2`)
/// - `HF_API_TOKEN` (optional)
pub fn config_qa() -> Result<InferenceModelConfig, AiInferenceError> {
    let endpoint = env_or("QA_URL", DEFAULT_HF_ENDPOINT);
    validate_http_endpoint("QA_URL", &endpoint)?;

    Ok(InferenceModelConfig {
        provider: InferenceProvider::HuggingFace,
        model: non_empty_model(env_or("QA_MODEL", DEFAULT_QA_MODEL))?,
        endpoint,
        api_key: env_opt("HF_API_TOKEN"),
        max_tokens: None,
        timeout_secs: timeout_secs()?,
    })
}

/// Constructs the text generation config.
///
/// # Env
/// - `GEN_PROVIDER` (default `huggingface`)
/// - `GEN_URL` (default per provider)
/// - `GEN_MODEL` (default `microsoft/DialoGPT-medium`)
/// - `GEN_MAX_NEW_TOKENS` (optional)
pub fn config_generation() -> Result<InferenceModelConfig, AiInferenceError> {
    let provider = match env_opt("GEN_PROVIDER") {
        Some(v) => v.parse::<InferenceProvider>()?,
        None => InferenceProvider::HuggingFace,
    };

    let (endpoint, api_key) = match provider {
        InferenceProvider::HuggingFace => (
            env_or("GEN_URL", DEFAULT_HF_ENDPOINT),
            env_opt("HF_API_TOKEN"),
        ),
        InferenceProvider::Ollama => match env_opt("GEN_URL") {
            Some(url) => (url, None),
            None => (ollama_endpoint()?, None),
        },
        InferenceProvider::Kserve => {
            return Err(ConfigError::UnsupportedProvider(provider.to_string()).into());
        }
    };
    validate_http_endpoint("GEN_URL", &endpoint)?;

    Ok(InferenceModelConfig {
        provider,
        model: non_empty_model(env_or("GEN_MODEL", DEFAULT_GEN_MODEL))?,
        endpoint,
        api_key,
        max_tokens: env_opt_u32("GEN_MAX_NEW_TOKENS")?,
        timeout_secs: timeout_secs()?,
    })
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
/// 3. `http://localhost:11434`
fn ollama_endpoint() -> Result<String, AiInferenceError> {
    if let Some(url) = env_opt("OLLAMA_URL") {
        return Ok(url);
    }
    if let Some(port) = env_opt("OLLAMA_PORT") {
        port.parse::<u16>().map_err(|_| ConfigError::InvalidNumber {
            var: "OLLAMA_PORT",
            reason: "expected u16 (1..=65535)",
        })?;
        return Ok(format!("http://localhost:{port}"));
    }
    Ok("http://localhost:11434".to_string())
}

fn timeout_secs() -> Result<Option<u64>, AiInferenceError> {
    Ok(Some(env_opt_u64("INFERENCE_TIMEOUT_SECS")?.unwrap_or(60)))
}

fn non_empty_model(model: String) -> Result<String, AiInferenceError> {
    if model.trim().is_empty() {
        Err(ConfigError::EmptyModel.into())
    } else {
        Ok(model)
    }
}
