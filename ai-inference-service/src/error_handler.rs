//! Unified error handling for `ai-inference-service`.
//!
//! This module exposes a single top-level error type [`AiInferenceError`] for
//! the whole library, and groups domain-specific errors in nested enums
//! ([`ConfigError`], [`HealthError`]). Small helpers for reading/validating
//! environment variables are provided and return the unified [`Result<T>`]
//! alias.
//!
//! All messages include the suffix `[AI Inference Service]` to simplify
//! attribution in logs.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;
use vision_chat::CapabilityError;

use crate::config::provider::InferenceProvider;

/* ------------------------------------------------------------------------- */
/* Public result alias                                                       */
/* ------------------------------------------------------------------------- */

/// Unified result alias for the entire crate.
pub type Result<T> = std::result::Result<T, AiInferenceError>;

/* ------------------------------------------------------------------------- */
/* Top-level error                                                           */
/* ------------------------------------------------------------------------- */

/// Top-level error for the `ai-inference-service` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AiInferenceError {
    /// Configuration/validation errors (startup).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Health-check errors.
    #[error(transparent)]
    Health(#[from] HealthError),

    /// Underlying HTTP transport error (connect, timeout, TLS).
    #[error("[AI Inference Service] transport error: {0}")]
    HttpTransport(#[from] reqwest::Error),

    /// Upstream returned a non-successful HTTP status.
    #[error("[AI Inference Service] {0}")]
    HttpStatus(HttpError),

    /// Response payload could not be decoded as expected.
    #[error("[AI Inference Service] decode error: {0}")]
    Decode(String),

    /// Uploaded bytes are not a decodable image.
    #[error("[AI Inference Service] image error: {0}")]
    Image(#[from] image::ImageError),

    /// A client was built with a config for another provider.
    #[error("[AI Inference Service] invalid provider: expected {expected}, got {got:?}")]
    InvalidProvider {
        expected: &'static str,
        got: InferenceProvider,
    },
}

/// Non-2xx response details.
#[derive(Debug, Clone)]
pub struct HttpError {
    pub status: StatusCode,
    pub url: String,
    /// Trimmed beginning of the response body.
    pub snippet: String,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {} from {}: {}", self.status, self.url, self.snippet)
    }
}

/// Keeps at most 240 characters of a response body for error messages.
pub fn make_snippet(text: &str) -> String {
    text.trim().chars().take(240).collect()
}

/// Maps transport-level failures onto the capability taxonomy used by the
/// orchestration layer.
impl From<AiInferenceError> for CapabilityError {
    fn from(err: AiInferenceError) -> Self {
        match err {
            AiInferenceError::Image(e) => CapabilityError::InvalidInput(e.to_string()),
            AiInferenceError::Decode(msg) => CapabilityError::InvalidResponse(msg),
            other => CapabilityError::Unavailable(other.to_string()),
        }
    }
}

/* ------------------------------------------------------------------------- */
/* Config errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for environment/config-driven setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is missing or empty.
    #[error("[AI Inference Service] missing required environment variable: {0}")]
    MissingVar(&'static str),

    /// A number failed to parse (like ports, limits, timeouts).
    #[error("[AI Inference Service] invalid number in {var}: {reason}")]
    InvalidNumber {
        var: &'static str,
        reason: &'static str,
    },

    /// Unsupported provider name.
    #[error("[AI Inference Service] unsupported provider: {0}")]
    UnsupportedProvider(String),

    /// Value had the wrong format (e.g., invalid URL).
    #[error("[AI Inference Service] invalid format in {var}: {reason}")]
    InvalidFormat {
        var: &'static str,
        reason: &'static str,
    },

    /// A numeric field was outside of the allowed range.
    #[error("[AI Inference Service] {field} is out of range: {detail}")]
    OutOfRange {
        field: &'static str,
        detail: &'static str,
    },

    /// Model name was empty.
    #[error("[AI Inference Service] model name must not be empty")]
    EmptyModel,
}

/* ------------------------------------------------------------------------- */
/* Health errors                                                             */
/* ------------------------------------------------------------------------- */

/// Error enum for backend health checks.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum HealthError {
    /// The endpoint is empty or does not start with http/https.
    #[error("[AI Inference Service] invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Upstream returned a non-successful HTTP status.
    #[error("[AI Inference Service] health check failed: {0}")]
    HttpStatus(HttpError),
}

/* ------------------------------------------------------------------------- */
/* Env helpers (return unified `Result<T>`)                                  */
/* ------------------------------------------------------------------------- */

/// Fetches a required, non-empty environment variable.
///
/// # Errors
/// Returns [`ConfigError::MissingVar`] if the variable is absent or empty.
pub fn must_env(name: &'static str) -> Result<String> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::MissingVar(name).into()),
    }
}

/// Fetches an optional environment variable, treating empty values as unset.
pub fn env_opt(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Fetches an environment variable or returns `default`.
pub fn env_or(name: &str, default: &str) -> String {
    env_opt(name).unwrap_or_else(|| default.to_string())
}

/// Parses an optional `u32` from env (`Ok(None)` if unset/empty).
///
/// # Errors
/// Returns [`ConfigError::InvalidNumber`] if set but not a valid `u32`.
pub fn env_opt_u32(name: &'static str) -> Result<Option<u32>> {
    match env_opt(name) {
        Some(v) => v.parse::<u32>().map(Some).map_err(|_| {
            AiInferenceError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u32",
            })
        }),
        None => Ok(None),
    }
}

/// Parses an optional `u64` from env (`Ok(None)` if unset/empty).
pub fn env_opt_u64(name: &'static str) -> Result<Option<u64>> {
    match env_opt(name) {
        Some(v) => v.parse::<u64>().map(Some).map_err(|_| {
            AiInferenceError::from(ConfigError::InvalidNumber {
                var: name,
                reason: "expected u64",
            })
        }),
        None => Ok(None),
    }
}

/* ------------------------------------------------------------------------- */
/* Validation helpers (return unified `Result<T>`)                           */
/* ------------------------------------------------------------------------- */

/// Validates that an HTTP endpoint starts with `http://` or `https://`.
pub fn validate_http_endpoint(var: &'static str, value: &str) -> Result<()> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidFormat {
            var,
            reason: "must start with http:// or https://",
        }
        .into())
    }
}

/// Validates that a floating-point value lies within an inclusive range.
///
/// # Errors
/// Returns [`ConfigError::OutOfRange`] if `value` is outside `[min, max]`
/// or not finite.
pub fn validate_range_f32(field: &'static str, value: f32, min: f32, max: f32) -> Result<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            detail: "expected value in inclusive range",
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_requires_http_scheme() {
        assert!(validate_http_endpoint("X", "http://localhost:8000").is_ok());
        assert!(validate_http_endpoint("X", "https://api-inference.huggingface.co").is_ok());
        assert!(validate_http_endpoint("X", "localhost:8000").is_err());
    }

    #[test]
    fn range_rejects_nan_and_out_of_bounds() {
        assert!(validate_range_f32("qa_threshold", 0.3, 0.0, 1.0).is_ok());
        assert!(validate_range_f32("qa_threshold", 1.5, 0.0, 1.0).is_err());
        assert!(validate_range_f32("qa_threshold", f32::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn snippet_is_bounded() {
        let long = "x".repeat(1000);
        assert_eq!(make_snippet(&long).len(), 240);
        assert_eq!(make_snippet("  short  "), "short");
    }

    #[test]
    fn capability_mapping() {
        let decode = AiInferenceError::Decode("bad json".into());
        assert_eq!(
            CapabilityError::from(decode),
            CapabilityError::InvalidResponse("bad json".into())
        );

        let status = AiInferenceError::HttpStatus(HttpError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            url: "http://qa/models/x".into(),
            snippet: "loading".into(),
        });
        assert!(matches!(
            CapabilityError::from(status),
            CapabilityError::Unavailable(msg) if msg.contains("503")
        ));
    }
}
