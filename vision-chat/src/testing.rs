//! In-crate capability doubles.

use std::sync::{Arc, Mutex};

use crate::capability::{
    CapabilityError, CapabilityFuture, ExtractiveAnswer, ExtractiveQa, ImageClassifier,
    SamplingProfile, TextGenerator,
};

/// QA double that records every `(question, context)` pair it receives.
pub(crate) struct MockQa {
    result: Result<ExtractiveAnswer, CapabilityError>,
    asked: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockQa {
    fn with(result: Result<ExtractiveAnswer, CapabilityError>) -> Self {
        Self {
            result,
            asked: Arc::default(),
        }
    }

    pub(crate) fn answering(answer: &str, score: f32) -> Self {
        Self::with(Ok(ExtractiveAnswer {
            answer: answer.into(),
            score,
        }))
    }

    pub(crate) fn failing() -> Self {
        Self::with(Err(CapabilityError::Unavailable("qa backend down".into())))
    }

    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<(String, String)>>> {
        Arc::clone(&self.asked)
    }
}

impl ExtractiveQa for MockQa {
    fn answer<'a>(
        &'a self,
        question: &'a str,
        context: &'a str,
    ) -> CapabilityFuture<'a, ExtractiveAnswer> {
        self.asked
            .lock()
            .unwrap()
            .push((question.to_string(), context.to_string()));
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}

enum Reply {
    Fixed(String),
    EchoThen(String),
    Fail,
}

/// Generator double that records every prompt it receives.
pub(crate) struct MockGenerator {
    reply: Reply,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    fn with(reply: Reply) -> Self {
        Self {
            reply,
            prompts: Arc::default(),
        }
    }

    pub(crate) fn replying(text: &str) -> Self {
        Self::with(Reply::Fixed(text.into()))
    }

    /// Echoes the prompt followed by `suffix`, like a causal LM decoding its own input.
    pub(crate) fn echoing(suffix: &str) -> Self {
        Self::with(Reply::EchoThen(suffix.into()))
    }

    pub(crate) fn failing() -> Self {
        Self::with(Reply::Fail)
    }

    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

impl TextGenerator for MockGenerator {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        _profile: &'a SamplingProfile,
    ) -> CapabilityFuture<'a, String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let result = match &self.reply {
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::EchoThen(suffix) => Ok(format!("{prompt}{suffix}")),
            Reply::Fail => Err(CapabilityError::Unavailable("generator down".into())),
        };
        Box::pin(async move { result })
    }
}

pub(crate) struct MockClassifier {
    result: Result<Vec<f32>, CapabilityError>,
}

impl MockClassifier {
    pub(crate) fn returning(probabilities: Vec<f32>) -> Self {
        Self {
            result: Ok(probabilities),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            result: Err(CapabilityError::InvalidInput("not an image".into())),
        }
    }
}

impl ImageClassifier for MockClassifier {
    fn class_probabilities<'a>(&'a self, _image: &'a [u8]) -> CapabilityFuture<'a, Vec<f32>> {
        let result = self.result.clone();
        Box::pin(async move { result })
    }
}
