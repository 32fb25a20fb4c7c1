//! Canned capabilities and state builders for router tests.

use std::sync::{Arc, Mutex};

use ai_inference_service::HealthStatus;
use services::uploads::{NamingPolicy, UploadStore};
use vision_chat::{
    AnswerOrchestrator, CapabilityError, CapabilityFuture, ExtractiveAnswer, ExtractiveQa,
    ImageAnalyzer, ImageClassifier, LabelStore, SamplingProfile, TextGenerator,
};

use crate::core::app_state::{AppState, BackendHealth};

pub struct FixedClassifier(pub Result<Vec<f32>, CapabilityError>);

impl ImageClassifier for FixedClassifier {
    fn class_probabilities<'a>(&'a self, _image: &'a [u8]) -> CapabilityFuture<'a, Vec<f32>> {
        let out = self.0.clone();
        Box::pin(async move { out })
    }
}

/// Pairs of `(question, context)` seen by [`FixedQa`].
pub type QaCalls = Arc<Mutex<Vec<(String, String)>>>;

pub struct FixedQa {
    pub reply: ExtractiveAnswer,
    pub calls: QaCalls,
}

impl ExtractiveQa for FixedQa {
    fn answer<'a>(
        &'a self,
        question: &'a str,
        context: &'a str,
    ) -> CapabilityFuture<'a, ExtractiveAnswer> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((question.to_string(), context.to_string()));
        }
        let out = self.reply.clone();
        Box::pin(async move { Ok(out) })
    }
}

/// Replies with a fixed continuation and records every prompt.
#[derive(Default)]
pub struct RecordingGenerator {
    pub reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl TextGenerator for RecordingGenerator {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        _profile: &'a SamplingProfile,
    ) -> CapabilityFuture<'a, String> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let out = format!("{prompt}{}", self.reply);
        Box::pin(async move { Ok(out) })
    }
}

pub struct StaticHealth(pub Vec<bool>);

impl BackendHealth for StaticHealth {
    fn check(
        &self,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Vec<HealthStatus>> + Send + '_>> {
        let statuses = self
            .0
            .iter()
            .zip(["classifier", "qa", "generation"])
            .map(|(&ok, role)| HealthStatus {
                role: role.to_string(),
                provider: "kserve".into(),
                endpoint: "http://localhost:8000".into(),
                model: "mock".into(),
                ok,
                latency_ms: 1,
                message: if ok { "ready".into() } else { "down".into() },
            })
            .collect();
        Box::pin(async move { statuses })
    }
}

/// Knobs for [`build_state`].
pub struct Fixture {
    pub probabilities: Result<Vec<f32>, CapabilityError>,
    pub qa: ExtractiveAnswer,
    pub qa_calls: QaCalls,
    pub generator: Arc<RecordingGenerator>,
    pub health: Vec<bool>,
    pub naming: NamingPolicy,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            probabilities: Ok(vec![0.05, 0.92, 0.03]),
            qa: ExtractiveAnswer {
                answer: "golden retriever".into(),
                score: 0.9,
            },
            qa_calls: QaCalls::default(),
            generator: Arc::new(RecordingGenerator::default()),
            health: vec![true, true, true],
            naming: NamingPolicy::Original,
        }
    }
}

pub async fn build_state(fixture: Fixture, upload_dir: &std::path::Path) -> Arc<AppState> {
    let labels: LabelStore = [
        (0usize, "tabby cat".to_string()),
        (1, "golden retriever".to_string()),
        (2, "tennis ball".to_string()),
    ]
    .into_iter()
    .collect();

    let analyzer = ImageAnalyzer::new(
        Arc::new(FixedClassifier(fixture.probabilities)),
        Arc::new(labels),
    );
    let qa = FixedQa {
        reply: fixture.qa,
        calls: fixture.qa_calls,
    };
    let orchestrator = AnswerOrchestrator::new(Arc::new(qa), fixture.generator);
    let uploads = UploadStore::new(upload_dir, fixture.naming)
        .await
        .unwrap();

    Arc::new(AppState::new(
        analyzer,
        orchestrator,
        uploads,
        Arc::new(StaticHealth(fixture.health)),
    ))
}
