//! Configuration management for the call-flow orchestrator
//!
//! Supports loading configuration from:
//! - TOML files
//! - Environment variables (CALLFLOW_ prefix)
//! - Serde defaults
//!
//! All business-specific values and guardrail thresholds live here.
//! Nothing is hardcoded in agent or tool logic.

pub mod settings;

pub use settings::{
    load_settings, BusinessSettings, EvaluationTargets, GuardrailSettings, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
