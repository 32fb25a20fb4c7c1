//! Image-grounded conversation core.
//!
//! An uploaded image goes through an [`ImageClassifier`], the raw class
//! probabilities are ranked by [`extract_top_k`], and [`synthesize`] turns
//! the ranking into a sentence. That sentence becomes the context of a
//! [`ConversationState`], against which [`AnswerOrchestrator`] answers
//! follow-up questions: extractive QA first, generative fallback when the
//! extractive score is too low.
//!
//! Model calls are abstract capabilities (see [`capability`]); concrete
//! HTTP clients live in `ai-inference-service`.

pub mod analysis;
pub mod capability;
pub mod conversation;
pub mod description;
pub mod labels;
pub mod orchestrator;
pub mod predictions;

#[cfg(test)]
pub(crate) mod testing;

pub use analysis::{ImageAnalysis, ImageAnalyzer};
pub use capability::{
    CapabilityError, CapabilityFuture, ExtractiveAnswer, ExtractiveQa, ImageClassifier,
    SamplingProfile, TextGenerator,
};
pub use conversation::ConversationState;
pub use description::synthesize;
pub use labels::{LabelStore, LabelStoreError};
pub use orchestrator::{AnswerOrchestrator, AnswerOutcome, AnswerSource};
pub use predictions::{RankedPrediction, extract_top_k, softmax};
