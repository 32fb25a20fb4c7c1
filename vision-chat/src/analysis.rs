//! Image → ranked labels → description.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    capability::{CapabilityError, ImageClassifier},
    description::synthesize,
    labels::LabelStore,
    predictions::{DEFAULT_TOP_K, RankedPrediction, extract_top_k},
};

/// Result of analyzing one uploaded image. Replaced wholesale by the next upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    pub predictions: Vec<RankedPrediction>,
    pub description: String,
}

/// Classifier plus label store, shared across requests.
pub struct ImageAnalyzer {
    classifier: Arc<dyn ImageClassifier>,
    labels: Arc<LabelStore>,
    top_k: usize,
}

impl ImageAnalyzer {
    pub fn new(classifier: Arc<dyn ImageClassifier>, labels: Arc<LabelStore>) -> Self {
        Self {
            classifier,
            labels,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    #[instrument(skip_all, fields(bytes = image.len()))]
    pub async fn analyze(&self, image: &[u8]) -> Result<ImageAnalysis, CapabilityError> {
        let probabilities = self.classifier.class_probabilities(image).await?;
        let predictions = extract_top_k(&probabilities, &self.labels, self.top_k);
        let description = synthesize(&predictions);

        info!(predictions = predictions.len(), "image analyzed");
        Ok(ImageAnalysis {
            predictions,
            description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{description::NOTHING_IDENTIFIED, testing::MockClassifier};

    fn labels() -> Arc<LabelStore> {
        Arc::new(
            [
                (0usize, "tabby cat".to_string()),
                (1, "golden retriever".to_string()),
                (2, "tennis ball".to_string()),
            ]
            .into_iter()
            .collect(),
        )
    }

    #[tokio::test]
    async fn produces_predictions_and_description() {
        let classifier = MockClassifier::returning(vec![0.02, 0.83, 0.15]);
        let analyzer = ImageAnalyzer::new(Arc::new(classifier), labels());

        let analysis = analyzer.analyze(b"jpeg bytes").await.unwrap();

        assert_eq!(analysis.predictions.len(), 2);
        assert_eq!(analysis.predictions[0].label, "golden retriever");
        assert_eq!(
            analysis.description,
            "I can see a golden retriever in the image. I also notice tennis ball."
        );
    }

    #[tokio::test]
    async fn unknown_classes_only_yield_nothing_identified() {
        let classifier = MockClassifier::returning(vec![0.0, 0.0, 0.0, 1.0]);
        let analyzer = ImageAnalyzer::new(Arc::new(classifier), labels()).with_top_k(1);

        let analysis = analyzer.analyze(b"png").await.unwrap();

        assert!(analysis.predictions.is_empty());
        assert_eq!(analysis.description, NOTHING_IDENTIFIED);
    }

    #[tokio::test]
    async fn classifier_errors_propagate() {
        let analyzer = ImageAnalyzer::new(Arc::new(MockClassifier::failing()), labels());
        assert!(analyzer.analyze(b"").await.is_err());
    }
}
