//! Conversational text continuation.
//!
//! Two wire protocols behind one client:
//! - **Hugging Face**: `POST {endpoint}/models/{model}` with
//!   `{"inputs", "parameters": {...}}` → `[{"generated_text"}]`. The full text
//!   (prompt included) is requested so callers can strip the echo themselves.
//! - **Ollama**: `POST {endpoint}/api/generate` with `raw = true` and
//!   `stream = false` → `{"response"}`. Ollama has no n-gram blocking, so
//!   `no_repeat_ngram_size` is not forwarded.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use vision_chat::{CapabilityError, CapabilityFuture, SamplingProfile, TextGenerator};

use crate::{
    config::{model_config::InferenceModelConfig, provider::InferenceProvider},
    error_handler::{AiInferenceError, Result},
    services::{build_client, post_json},
};

pub struct TextGenerationService {
    client: reqwest::Client,
    cfg: InferenceModelConfig,
    backend: Backend,
    url_generate: String,
}

#[derive(Debug, Clone, Copy)]
enum Backend {
    HuggingFace,
    Ollama,
}

impl TextGenerationService {
    /// # Errors
    /// - [`AiInferenceError::InvalidProvider`] for providers without text generation
    /// - [`AiInferenceError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: InferenceModelConfig) -> Result<Self> {
        let base = cfg.base_url();
        let (backend, url_generate) = match cfg.provider {
            InferenceProvider::HuggingFace => {
                (Backend::HuggingFace, format!("{}/models/{}", base, cfg.model))
            }
            InferenceProvider::Ollama => (Backend::Ollama, format!("{}/api/generate", base)),
            InferenceProvider::Kserve => {
                return Err(AiInferenceError::InvalidProvider {
                    expected: "huggingface or ollama",
                    got: cfg.provider,
                });
            }
        };
        let client = build_client(&cfg)?;
        Ok(Self {
            client,
            cfg,
            backend,
            url_generate,
        })
    }

    pub fn config(&self) -> &InferenceModelConfig {
        &self.cfg
    }

    #[instrument(skip_all, fields(model = %self.cfg.model, provider = %self.cfg.provider))]
    pub async fn complete(&self, prompt: &str, profile: &SamplingProfile) -> Result<String> {
        let max_new_tokens = profile.max_new_tokens.or(self.cfg.max_tokens);
        let text = match self.backend {
            Backend::HuggingFace => {
                let body = HfGenerateRequest::new(prompt, profile, max_new_tokens);
                let resp: HfGenerateResponse = post_json(
                    &self.client,
                    &self.url_generate,
                    self.cfg.api_key.as_deref(),
                    &body,
                )
                .await?;
                resp.into_text()?
            }
            Backend::Ollama => {
                let body = OllamaGenerateRequest::new(&self.cfg.model, prompt, profile, max_new_tokens);
                let resp: OllamaGenerateResponse =
                    post_json(&self.client, &self.url_generate, None, &body).await?;
                resp.response
            }
        };
        debug!(chars = text.chars().count(), "generation received");
        Ok(text)
    }
}

impl TextGenerator for TextGenerationService {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        profile: &'a SamplingProfile,
    ) -> CapabilityFuture<'a, String> {
        Box::pin(async move {
            self.complete(prompt, profile)
                .await
                .map_err(CapabilityError::from)
        })
    }
}

/* ==========================
Hugging Face payloads
========================== */

#[derive(Debug, Serialize)]
struct HfGenerateRequest<'a> {
    inputs: &'a str,
    parameters: HfParameters,
    options: HfOptions,
}

#[derive(Debug, Serialize)]
struct HfParameters {
    do_sample: bool,
    temperature: f32,
    top_k: u32,
    top_p: f32,
    no_repeat_ngram_size: u32,
    return_full_text: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_new_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct HfOptions {
    wait_for_model: bool,
    use_cache: bool,
}

impl<'a> HfGenerateRequest<'a> {
    fn new(prompt: &'a str, profile: &SamplingProfile, max_new_tokens: Option<u32>) -> Self {
        Self {
            inputs: prompt,
            parameters: HfParameters {
                do_sample: profile.do_sample,
                temperature: profile.temperature,
                top_k: profile.top_k,
                top_p: profile.top_p,
                no_repeat_ngram_size: profile.no_repeat_ngram_size,
                return_full_text: true,
                max_new_tokens,
            },
            // Sampling is requested, so cached (identical) outputs are unwanted.
            options: HfOptions {
                wait_for_model: true,
                use_cache: false,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct HfGenerated {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HfGenerateResponse {
    Many(Vec<HfGenerated>),
    One(HfGenerated),
}

impl HfGenerateResponse {
    fn into_text(self) -> Result<String> {
        match self {
            HfGenerateResponse::One(g) => Ok(g.generated_text),
            HfGenerateResponse::Many(list) => list
                .into_iter()
                .next()
                .map(|g| g.generated_text)
                .ok_or_else(|| AiInferenceError::Decode("empty generation list".into())),
        }
    }
}

/* ==========================
Ollama payloads
========================== */

#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    raw: bool,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

impl<'a> OllamaGenerateRequest<'a> {
    fn new(
        model: &'a str,
        prompt: &'a str,
        profile: &SamplingProfile,
        max_new_tokens: Option<u32>,
    ) -> Self {
        Self {
            model,
            prompt,
            raw: true,
            stream: false,
            options: OllamaOptions {
                // Greedy decoding in Ollama is temperature 0.
                temperature: if profile.do_sample { profile.temperature } else { 0.0 },
                top_k: profile.top_k,
                top_p: profile.top_p,
                num_predict: max_new_tokens,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}
