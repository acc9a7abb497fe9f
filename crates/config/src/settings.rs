//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::ConfigError;

/// Root settings aggregating all sub-configs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Business-specific settings
    #[serde(default)]
    pub business: BusinessSettings,

    /// Guardrail and escalation thresholds
    #[serde(default)]
    pub guardrails: GuardrailSettings,

    /// Evaluation targets consumed by analytics
    #[serde(default)]
    pub evaluation: EvaluationTargets,

    /// Log level filter ("info", "debug", ...)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Agent name reported in logs
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
}

/// Business-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSettings {
    /// Trading name read out in the greeting
    #[serde(default = "default_business_name")]
    pub name: String,
    #[serde(default = "default_hours_weekday")]
    pub hours_weekday: String,
    #[serde(default = "default_hours_weekend")]
    pub hours_weekend: String,
    #[serde(default = "default_emergency_hours")]
    pub emergency_hours: String,
    #[serde(default = "default_service_area")]
    pub service_area: String,
    /// Phone number quoted for emergencies
    #[serde(default = "default_emergency_line")]
    pub emergency_line: String,
    /// Promised callback window after a human handoff
    #[serde(default = "default_callback_sla_minutes")]
    pub callback_sla_minutes: u32,
}

fn default_business_name() -> String {
    "Reliable Home Services".to_string()
}

fn default_hours_weekday() -> String {
    "Monday to Friday 8am to 6pm".to_string()
}

fn default_hours_weekend() -> String {
    "Saturday 9am to 2pm, closed Sunday".to_string()
}

fn default_emergency_hours() -> String {
    "Available 24/7 at premium rates".to_string()
}

fn default_service_area() -> String {
    "Greater Melbourne metro area".to_string()
}

fn default_emergency_line() -> String {
    "1300-555-000".to_string()
}

fn default_callback_sla_minutes() -> u32 {
    30
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            name: default_business_name(),
            hours_weekday: default_hours_weekday(),
            hours_weekend: default_hours_weekend(),
            emergency_hours: default_emergency_hours(),
            service_area: default_service_area(),
            emergency_line: default_emergency_line(),
            callback_sla_minutes: default_callback_sla_minutes(),
        }
    }
}

/// Thresholds for escalation and guardrail triggers
///
/// Runtime-tunable: changing these alters guardrail and slot failure
/// behavior without code changes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GuardrailSettings {
    /// Error count at which the escalation guardrail fires
    #[serde(default = "default_confusion_threshold")]
    pub confusion_threshold: u32,
    /// Validation attempts allowed per slot before forced escalation
    #[serde(default = "default_max_slot_retries")]
    pub max_slot_retries: u32,
    /// Read-back attempts allowed at the confirmation gate
    #[serde(default = "default_max_confirmation_attempts")]
    pub max_confirmation_attempts: u32,
}

fn default_confusion_threshold() -> u32 {
    3
}

fn default_max_slot_retries() -> u32 {
    3
}

fn default_max_confirmation_attempts() -> u32 {
    2
}

impl Default for GuardrailSettings {
    fn default() -> Self {
        Self {
            confusion_threshold: default_confusion_threshold(),
            max_slot_retries: default_max_slot_retries(),
            max_confirmation_attempts: default_max_confirmation_attempts(),
        }
    }
}

/// Evaluation framework targets
///
/// Not consumed by the control core itself; exported for analytics
/// consumers that score completed session logs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EvaluationTargets {
    #[serde(default = "default_target_success_rate")]
    pub target_success_rate: f64,
    #[serde(default = "default_target_containment_rate")]
    pub target_containment_rate: f64,
    #[serde(default = "default_target_escalation_rate")]
    pub target_escalation_rate: f64,
    #[serde(default = "default_target_slot_fill_rate")]
    pub target_slot_fill_rate: f64,
    #[serde(default = "default_target_max_turns")]
    pub target_max_turns: u32,
}

fn default_target_success_rate() -> f64 {
    0.70
}

fn default_target_containment_rate() -> f64 {
    0.85
}

fn default_target_escalation_rate() -> f64 {
    0.15
}

fn default_target_slot_fill_rate() -> f64 {
    0.80
}

fn default_target_max_turns() -> u32 {
    16
}

impl Default for EvaluationTargets {
    fn default() -> Self {
        Self {
            target_success_rate: default_target_success_rate(),
            target_containment_rate: default_target_containment_rate(),
            target_escalation_rate: default_target_escalation_rate(),
            target_slot_fill_rate: default_target_slot_fill_rate(),
            target_max_turns: default_target_max_turns(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_agent_name() -> String {
    "voice-receptionist".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            business: BusinessSettings::default(),
            guardrails: GuardrailSettings::default(),
            evaluation: EvaluationTargets::default(),
            log_level: default_log_level(),
            agent_name: default_agent_name(),
        }
    }
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings are within acceptable ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.guardrails.confusion_threshold < 1 {
            return Err(ConfigError::InvalidValue {
                field: "guardrails.confusion_threshold".to_string(),
                message: format!("must be >= 1, got {}", self.guardrails.confusion_threshold),
            });
        }
        if self.guardrails.max_slot_retries < 1 {
            return Err(ConfigError::InvalidValue {
                field: "guardrails.max_slot_retries".to_string(),
                message: format!("must be >= 1, got {}", self.guardrails.max_slot_retries),
            });
        }
        if self.guardrails.max_confirmation_attempts < 1 {
            return Err(ConfigError::InvalidValue {
                field: "guardrails.max_confirmation_attempts".to_string(),
                message: format!(
                    "must be >= 1, got {}",
                    self.guardrails.max_confirmation_attempts
                ),
            });
        }
        if self.business.callback_sla_minutes < 1 {
            return Err(ConfigError::InvalidValue {
                field: "business.callback_sla_minutes".to_string(),
                message: format!("must be >= 1, got {}", self.business.callback_sla_minutes),
            });
        }

        for (field, value) in [
            (
                "evaluation.target_success_rate",
                self.evaluation.target_success_rate,
            ),
            (
                "evaluation.target_containment_rate",
                self.evaluation.target_containment_rate,
            ),
            (
                "evaluation.target_escalation_rate",
                self.evaluation.target_escalation_rate,
            ),
            (
                "evaluation.target_slot_fill_rate",
                self.evaluation.target_slot_fill_rate,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("must be between 0.0 and 1.0, got {}", value),
                });
            }
        }

        if self.evaluation.target_max_turns < 1 {
            return Err(ConfigError::InvalidValue {
                field: "evaluation.target_max_turns".to_string(),
                message: format!("must be >= 1, got {}", self.evaluation.target_max_turns),
            });
        }

        Ok(())
    }
}

/// Load settings from an optional file and the environment
///
/// Precedence: defaults < file < `CALLFLOW_`-prefixed environment
/// variables (e.g. `CALLFLOW_GUARDRAILS__MAX_SLOT_RETRIES=5`).
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        builder = builder.add_source(File::from(path));
    }

    let config = builder
        .add_source(Environment::with_prefix("CALLFLOW").separator("__"))
        .build()?;

    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    tracing::info!(business = %settings.business.name, "configuration loaded");
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::new();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.guardrails.confusion_threshold, 3);
        assert_eq!(settings.guardrails.max_slot_retries, 3);
        assert_eq!(settings.business.callback_sla_minutes, 30);
    }

    #[test]
    fn test_rejects_zero_confusion_threshold() {
        let mut settings = Settings::new();
        settings.guardrails.confusion_threshold = 0;
        let err = settings.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. }
            if field == "guardrails.confusion_threshold"));
    }

    #[test]
    fn test_rejects_zero_slot_retries() {
        let mut settings = Settings::new();
        settings.guardrails.max_slot_retries = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_rate() {
        let mut settings = Settings::new();
        settings.evaluation.target_success_rate = 1.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let err = load_settings(Some(Path::new("/nonexistent/callflow.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_settings_roundtrip() {
        let settings = Settings::new();
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.guardrails.max_confirmation_attempts,
            settings.guardrails.max_confirmation_attempts
        );
    }
}
