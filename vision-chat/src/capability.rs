//! External model capabilities consumed as black boxes.
//!
//! Async is required because every real backend is a remote inference
//! server. The traits stay object-safe so the transport can hold them as
//! `Arc<dyn ...>` built once at startup.

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boxed future returned by capability calls.
pub type CapabilityFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, CapabilityError>> + Send + 'a>>;

/// Failure of an external capability.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CapabilityError {
    /// Backend unreachable, timed out or answered with a non-success status.
    #[error("inference backend unavailable: {0}")]
    Unavailable(String),

    /// The input could not be turned into a model request (e.g. undecodable image).
    #[error("invalid inference input: {0}")]
    InvalidInput(String),

    /// The backend answered with something we could not interpret.
    #[error("invalid inference response: {0}")]
    InvalidResponse(String),
}

/// Image classification returning a probability per class index.
pub trait ImageClassifier: Send + Sync {
    fn class_probabilities<'a>(&'a self, image: &'a [u8]) -> CapabilityFuture<'a, Vec<f32>>;
}

/// Span located by an extractive QA model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractiveAnswer {
    pub answer: String,
    pub score: f32,
}

/// Extractive question answering over a context string.
pub trait ExtractiveQa: Send + Sync {
    fn answer<'a>(
        &'a self,
        question: &'a str,
        context: &'a str,
    ) -> CapabilityFuture<'a, ExtractiveAnswer>;
}

/// Sampling configuration for text continuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingProfile {
    pub do_sample: bool,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    /// Forbid repeating any n-gram of this size.
    pub no_repeat_ngram_size: u32,
    pub max_new_tokens: Option<u32>,
}

impl SamplingProfile {
    /// Varied, non-greedy phrasing for conversational fallback answers.
    pub fn conversational() -> Self {
        Self {
            do_sample: true,
            temperature: 0.8,
            top_k: 100,
            top_p: 0.7,
            no_repeat_ngram_size: 3,
            max_new_tokens: None,
        }
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: Option<u32>) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }
}

impl Default for SamplingProfile {
    fn default() -> Self {
        Self::conversational()
    }
}

/// Free-form text continuation of a prompt.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        profile: &'a SamplingProfile,
    ) -> CapabilityFuture<'a, String>;
}
