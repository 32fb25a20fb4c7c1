//! Remote inference clients for the vision-chat backend.
//!
//! Each client implements one capability trait from `vision-chat`:
//!
//! - [`services::classifier_service::KserveClassifier`] → `ImageClassifier`
//! - [`services::qa_service::HfQuestionAnswering`] → `ExtractiveQa`
//! - [`services::generation_service::TextGenerationService`] → `TextGenerator`
//!
//! [`service_profiles::InferenceProfiles`] wires all three from environment
//! variables and exposes health checks.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use error_handler::{AiInferenceError, ConfigError, Result};
pub use health_service::HealthStatus;
pub use service_profiles::InferenceProfiles;
