pub mod default_config;
pub mod model_config;
pub mod provider;
