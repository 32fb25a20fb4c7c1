//! Question answering against the current image context.
//!
//! Each question is first sent to an extractive QA model with the image
//! description as context. A confident span (`score > qa_threshold`) is the
//! answer; anything else goes to a generative model seeded with the most
//! recent turns. The two paths are alternatives, never blended.

use std::sync::Arc;

use tracing::{debug, error, info, instrument};

use crate::{
    capability::{CapabilityError, ExtractiveQa, SamplingProfile, TextGenerator},
    conversation::ConversationState,
};

/// Reply when no image has been analyzed yet.
pub const NO_CONTEXT_REPLY: &str =
    "I don't have any image context to work with. Please upload an image first.";

/// Reply when a capability failed while answering.
pub const ERROR_REPLY: &str =
    "I apologize, but I encountered an error while processing your question.";

/// Prefix of the templated answer used when generation yields too little text.
pub const UNSURE_PREFIX: &str = "I'm not sure about that specific detail, but ";

pub const DEFAULT_QA_THRESHOLD: f32 = 0.3;
pub const DEFAULT_HISTORY_WINDOW: usize = 3;
pub const DEFAULT_MIN_CONTINUATION_CHARS: usize = 10;

/// Which path produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    NoContext,
    Extractive,
    Generative,
    TemplatedFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub text: String,
    pub source: AnswerSource,
}

impl AnswerOutcome {
    fn new(text: impl Into<String>, source: AnswerSource) -> Self {
        Self {
            text: text.into(),
            source,
        }
    }
}

/// Routes questions between extractive QA and generative fallback.
///
/// Built once at startup; capabilities are shared, conversation state is
/// passed in per call so the caller decides how sessions are isolated.
pub struct AnswerOrchestrator {
    qa: Arc<dyn ExtractiveQa>,
    generator: Arc<dyn TextGenerator>,
    profile: SamplingProfile,
    qa_threshold: f32,
    history_window: usize,
    min_continuation_chars: usize,
}

impl AnswerOrchestrator {
    pub fn new(qa: Arc<dyn ExtractiveQa>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            qa,
            generator,
            profile: SamplingProfile::conversational(),
            qa_threshold: DEFAULT_QA_THRESHOLD,
            history_window: DEFAULT_HISTORY_WINDOW,
            min_continuation_chars: DEFAULT_MIN_CONTINUATION_CHARS,
        }
    }

    pub fn with_profile(mut self, profile: SamplingProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_qa_threshold(mut self, threshold: f32) -> Self {
        self.qa_threshold = threshold;
        self
    }

    /// Answers `question`, never failing.
    ///
    /// Capability errors are logged and replaced by [`ERROR_REPLY`]; the
    /// question stays in history, no answer is recorded for it.
    pub async fn answer(&self, question: &str, state: &mut ConversationState) -> String {
        match self.try_answer(question, state).await {
            Ok(outcome) => outcome.text,
            Err(err) => {
                error!(error = %err, "failed to answer question");
                ERROR_REPLY.to_string()
            }
        }
    }

    /// Answers `question` and reports which path produced the answer.
    ///
    /// On success two entries are appended to history (question, answer).
    /// On error only the question has been appended.
    #[instrument(skip_all, fields(question_len = question.len()))]
    pub async fn try_answer(
        &self,
        question: &str,
        state: &mut ConversationState,
    ) -> Result<AnswerOutcome, CapabilityError> {
        let Some(context) = state.image_context().map(str::to_owned) else {
            debug!("no image context; asking caller to upload an image");
            return Ok(AnswerOutcome::new(NO_CONTEXT_REPLY, AnswerSource::NoContext));
        };

        state.record_turn(question);

        let extracted = self.qa.answer(question, &context).await?;
        let outcome = if extracted.score > self.qa_threshold {
            info!(score = extracted.score, "using extractive answer");
            AnswerOutcome::new(extracted.answer, AnswerSource::Extractive)
        } else {
            info!(
                score = extracted.score,
                "extractive score below threshold; using conversational model"
            );
            self.fallback(state, &context).await?
        };

        state.record_turn(outcome.text.clone());
        Ok(outcome)
    }

    /// Generative answer seeded with the most recent turns.
    ///
    /// Continuations shorter than the minimum are replaced by a sentence that
    /// restates the image context.
    pub async fn generate(
        &self,
        question: &str,
        state: &ConversationState,
    ) -> Result<String, CapabilityError> {
        debug!(question_len = question.len(), "generating conversational answer");
        let context = state
            .image_context()
            .ok_or_else(|| CapabilityError::InvalidInput("no image context".into()))?;
        Ok(self.fallback(state, context).await?.text)
    }

    async fn fallback(
        &self,
        state: &ConversationState,
        context: &str,
    ) -> Result<AnswerOutcome, CapabilityError> {
        let prompt = state.recent(self.history_window).join(" ");
        let generated = self.generator.generate(&prompt, &self.profile).await?;

        let continuation = generated
            .strip_prefix(prompt.as_str())
            .unwrap_or(generated.as_str())
            .trim();

        if continuation.chars().count() < self.min_continuation_chars {
            debug!(
                chars = continuation.chars().count(),
                "continuation too short; restating image context"
            );
            return Ok(AnswerOutcome::new(
                format!("{UNSURE_PREFIX}{context}"),
                AnswerSource::TemplatedFallback,
            ));
        }

        Ok(AnswerOutcome::new(continuation, AnswerSource::Generative))
    }
}
