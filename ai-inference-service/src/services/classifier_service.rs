//! Image classification over the Open Inference Protocol (KServe v2 / Triton).
//!
//! - `POST {endpoint}/v2/models/{model}/infer` with one FP32 tensor of shape
//!   `[1, 3, H, W]`
//! - reads the configured output tensor (first one by default) and turns it
//!   into a probability distribution over class indices

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use vision_chat::{CapabilityError, CapabilityFuture, ImageClassifier, softmax};

use crate::{
    config::{
        model_config::{ClassifierConfig, ClassifierOutput},
        provider::InferenceProvider,
    },
    error_handler::{AiInferenceError, Result},
    services::{build_client, post_json, preprocess::ImagePreprocessor},
};

/// Thin client for a served image classification model.
pub struct KserveClassifier {
    client: reqwest::Client,
    cfg: ClassifierConfig,
    preprocessor: ImagePreprocessor,
    url_infer: String,
}

impl KserveClassifier {
    /// # Errors
    /// - [`AiInferenceError::InvalidProvider`] if the config is not for KServe
    /// - [`AiInferenceError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: ClassifierConfig) -> Result<Self> {
        if cfg.model.provider != InferenceProvider::Kserve {
            return Err(AiInferenceError::InvalidProvider {
                expected: "kserve",
                got: cfg.model.provider,
            });
        }

        let client = build_client(&cfg.model)?;
        let url_infer = format!("{}/v2/models/{}/infer", cfg.model.base_url(), cfg.model.model);
        let preprocessor = ImagePreprocessor::imagenet(cfg.input_size);

        Ok(Self {
            client,
            cfg,
            preprocessor,
            url_infer,
        })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.cfg
    }

    /// Preprocesses `image`, runs inference and returns class probabilities.
    #[instrument(skip_all, fields(model = %self.cfg.model.model, bytes = image.len()))]
    pub async fn classify(&self, image: &[u8]) -> Result<Vec<f32>> {
        let tensor = self.preprocessor.to_chw(image)?;

        let body = InferRequest {
            inputs: vec![InputTensor {
                name: &self.cfg.input_name,
                shape: self.preprocessor.shape(),
                datatype: "FP32",
                data: &tensor,
            }],
            outputs: self
                .cfg
                .output_name
                .as_deref()
                .map(|name| vec![RequestedOutput { name }])
                .unwrap_or_default(),
        };

        let resp: InferResponse = post_json(&self.client, &self.url_infer, None, &body).await?;
        let scores = select_output(resp, self.cfg.output_name.as_deref())?;
        debug!(classes = scores.len(), "classifier output received");
        Ok(to_distribution(scores, self.cfg.output))
    }
}

impl ImageClassifier for KserveClassifier {
    fn class_probabilities<'a>(&'a self, image: &'a [u8]) -> CapabilityFuture<'a, Vec<f32>> {
        Box::pin(async move { self.classify(image).await.map_err(CapabilityError::from) })
    }
}

/// Picks the named output tensor, or the first one.
fn select_output(resp: InferResponse, name: Option<&str>) -> Result<Vec<f32>> {
    let mut outputs = resp.outputs.into_iter();
    let tensor = match name {
        Some(name) => outputs.find(|t| t.name == name),
        None => outputs.next(),
    };
    let tensor = tensor.ok_or_else(|| {
        AiInferenceError::Decode(format!(
            "output tensor `{}` missing from response",
            name.unwrap_or("<first>")
        ))
    })?;
    if tensor.data.is_empty() {
        return Err(AiInferenceError::Decode("output tensor is empty".into()));
    }
    Ok(tensor.data)
}

/// Converts raw output into probabilities summing to one.
fn to_distribution(scores: Vec<f32>, kind: ClassifierOutput) -> Vec<f32> {
    match kind {
        ClassifierOutput::Logits => softmax(&scores),
        ClassifierOutput::Probabilities => {
            let sum: f32 = scores.iter().filter(|v| v.is_finite()).sum();
            if sum > 0.0 && (sum - 1.0).abs() > 1e-3 {
                scores.into_iter().map(|v| v / sum).collect()
            } else {
                scores
            }
        }
    }
}

/* ==========================
Open Inference Protocol payloads
========================== */

#[derive(Debug, Serialize)]
struct InferRequest<'a> {
    inputs: Vec<InputTensor<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    outputs: Vec<RequestedOutput<'a>>,
}

#[derive(Debug, Serialize)]
struct InputTensor<'a> {
    name: &'a str,
    shape: [u64; 4],
    datatype: &'static str,
    data: &'a [f32],
}

#[derive(Debug, Serialize)]
struct RequestedOutput<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct InferResponse {
    outputs: Vec<OutputTensor>,
}

#[derive(Debug, Deserialize)]
struct OutputTensor {
    name: String,
    data: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> InferResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn selects_named_or_first_output() {
        let json = r#"{"model_name":"resnet50","outputs":[
            {"name":"features","shape":[1,2],"datatype":"FP32","data":[9.0,9.0]},
            {"name":"logits","shape":[1,3],"datatype":"FP32","data":[0.1,0.2,0.7]}]}"#;
        assert_eq!(select_output(response(json), Some("logits")).unwrap(), vec![0.1, 0.2, 0.7]);
        assert_eq!(select_output(response(json), None).unwrap(), vec![9.0, 9.0]);
        assert!(select_output(response(json), Some("missing")).is_err());
    }

    #[test]
    fn logits_become_a_distribution() {
        let p = to_distribution(vec![2.0, 1.0, 0.0], ClassifierOutput::Logits);
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(p[0] > p[1]);
    }

    #[test]
    fn unnormalized_probabilities_are_rescaled() {
        let p = to_distribution(vec![2.0, 2.0], ClassifierOutput::Probabilities);
        assert_eq!(p, vec![0.5, 0.5]);
        let q = to_distribution(vec![0.25, 0.75], ClassifierOutput::Probabilities);
        assert_eq!(q, vec![0.25, 0.75]);
    }

    #[test]
    fn request_serializes_as_v2_tensor() {
        let data = [0.5f32, -0.5];
        let body = InferRequest {
            inputs: vec![InputTensor {
                name: "input",
                shape: [1, 3, 224, 224],
                datatype: "FP32",
                data: &data,
            }],
            outputs: Vec::new(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["inputs"][0]["datatype"], "FP32");
        assert_eq!(json["inputs"][0]["shape"][2], 224);
        assert!(json.get("outputs").is_none());
    }
}
