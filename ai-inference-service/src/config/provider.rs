use std::{fmt, str::FromStr};

use crate::error_handler::ConfigError;

/// Represents the inference backend a client talks to.
///
/// - `Kserve`: Open Inference Protocol (KServe v2 / Triton) tensor endpoint.
/// - `HuggingFace`: Hugging Face inference API or a compatible endpoint.
/// - `Ollama`: local Ollama runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InferenceProvider {
    Kserve,
    HuggingFace,
    Ollama,
}

impl fmt::Display for InferenceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InferenceProvider::Kserve => "kserve",
            InferenceProvider::HuggingFace => "huggingface",
            InferenceProvider::Ollama => "ollama",
        };
        f.write_str(name)
    }
}

impl FromStr for InferenceProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kserve" | "triton" | "v2" => Ok(InferenceProvider::Kserve),
            "huggingface" | "hf" => Ok(InferenceProvider::HuggingFace),
            "ollama" => Ok(InferenceProvider::Ollama),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
