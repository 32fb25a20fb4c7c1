//! Extractive question answering via the Hugging Face inference API.
//!
//! - `POST {endpoint}/models/{model}` with `{"inputs": {"question", "context"}}`
//! - response `{ "answer", "score", "start", "end" }`, sometimes wrapped in a
//!   one-element array

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use vision_chat::{CapabilityError, CapabilityFuture, ExtractiveAnswer, ExtractiveQa};

use crate::{
    config::{model_config::InferenceModelConfig, provider::InferenceProvider},
    error_handler::{AiInferenceError, Result},
    services::{build_client, post_json},
};

pub struct HfQuestionAnswering {
    client: reqwest::Client,
    cfg: InferenceModelConfig,
    url_model: String,
}

impl HfQuestionAnswering {
    /// # Errors
    /// - [`AiInferenceError::InvalidProvider`] if the config is not for Hugging Face
    /// - [`AiInferenceError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: InferenceModelConfig) -> Result<Self> {
        if cfg.provider != InferenceProvider::HuggingFace {
            return Err(AiInferenceError::InvalidProvider {
                expected: "huggingface",
                got: cfg.provider,
            });
        }
        let client = build_client(&cfg)?;
        let url_model = format!("{}/models/{}", cfg.base_url(), cfg.model);
        Ok(Self {
            client,
            cfg,
            url_model,
        })
    }

    pub fn config(&self) -> &InferenceModelConfig {
        &self.cfg
    }

    #[instrument(skip_all, fields(model = %self.cfg.model))]
    pub async fn ask(&self, question: &str, context: &str) -> Result<ExtractiveAnswer> {
        let body = QaRequest {
            inputs: QaInputs { question, context },
        };
        let resp: QaResponse =
            post_json(&self.client, &self.url_model, self.cfg.api_key.as_deref(), &body).await?;
        let answer = resp.into_answer()?;
        debug!(score = answer.score, "qa answer received");
        Ok(answer)
    }
}

impl ExtractiveQa for HfQuestionAnswering {
    fn answer<'a>(
        &'a self,
        question: &'a str,
        context: &'a str,
    ) -> CapabilityFuture<'a, ExtractiveAnswer> {
        Box::pin(async move {
            self.ask(question, context)
                .await
                .map_err(CapabilityError::from)
        })
    }
}

#[derive(Debug, Serialize)]
struct QaRequest<'a> {
    inputs: QaInputs<'a>,
}

#[derive(Debug, Serialize)]
struct QaInputs<'a> {
    question: &'a str,
    context: &'a str,
}

#[derive(Debug, Deserialize)]
struct QaSpan {
    answer: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QaResponse {
    One(QaSpan),
    Many(Vec<QaSpan>),
}

impl QaResponse {
    fn into_answer(self) -> Result<ExtractiveAnswer> {
        let span = match self {
            QaResponse::One(span) => span,
            QaResponse::Many(spans) => spans
                .into_iter()
                .max_by(|a, b| a.score.total_cmp(&b.score))
                .ok_or_else(|| AiInferenceError::Decode("empty answer list".into()))?,
        };
        Ok(ExtractiveAnswer {
            answer: span.answer.trim().to_string(),
            score: span.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_object_and_array_shapes() {
        let one: QaResponse =
            serde_json::from_str(r#"{"score":0.92,"start":2,"end":7,"answer":" a dog"}"#).unwrap();
        assert_eq!(
            one.into_answer().unwrap(),
            ExtractiveAnswer {
                answer: "a dog".into(),
                score: 0.92
            }
        );

        let many: QaResponse = serde_json::from_str(
            r#"[{"score":0.1,"answer":"field"},{"score":0.4,"answer":"dog"}]"#,
        )
        .unwrap();
        assert_eq!(many.into_answer().unwrap().answer, "dog");

        let empty: QaResponse = serde_json::from_str("[]").unwrap();
        assert!(empty.into_answer().is_err());
    }

    #[test]
    fn request_shape() {
        let body = QaRequest {
            inputs: QaInputs {
                question: "What is in the image?",
                context: "a dog running in a field",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"]["context"], "a dog running in a field");
    }

    #[test]
    fn rejects_wrong_provider() {
        let cfg = InferenceModelConfig {
            provider: InferenceProvider::Ollama,
            model: "m".into(),
            endpoint: "http://localhost".into(),
            api_key: None,
            max_tokens: None,
            timeout_secs: None,
        };
        assert!(matches!(
            HfQuestionAnswering::new(cfg),
            Err(AiInferenceError::InvalidProvider { .. })
        ));
    }
}
