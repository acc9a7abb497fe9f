//! Slot-filling manager with a three-phase pattern: collect, validate, confirm
//!
//! Confirmation gates prevent premature booking execution. Correction
//! history and retry counts are tracked for evaluation analysis.

use std::collections::HashMap;

use callflow_config::GuardrailSettings;
use callflow_tools::services::get_valid_service_terms;
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Validation thresholds
const MIN_NAME_LENGTH: usize = 2;
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;
const MIN_ADDRESS_LENGTH: usize = 5;

/// Lifecycle status of a slot value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Empty,
    /// Raw value captured but failed validation
    Collected,
    Validated,
    Confirmed,
    Corrected,
}

/// Strip a phone number down to digits, keeping a leading `+`
///
/// `"0412 345 678"` becomes `"0412345678"`, and
/// `"+61 (412) 345-678"` becomes `"+61412345678"`.
pub fn normalize_phone(value: &str) -> String {
    let value = value.trim();
    if let Some(rest) = value.strip_prefix('+') {
        let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
        format!("+{}", digits)
    } else {
        value.chars().filter(|c| c.is_ascii_digit()).collect()
    }
}

/// Validation rule attached to a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotValidator {
    Name,
    Phone,
    Service,
    Date,
    Time,
    Address,
}

impl SlotValidator {
    fn validate(self, value: &str) -> bool {
        match self {
            Self::Name => value.trim().len() >= MIN_NAME_LENGTH,
            Self::Phone => {
                let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
                (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
            }
            Self::Service => {
                let normalized = value.to_lowercase();
                let normalized = normalized.trim();
                get_valid_service_terms()
                    .iter()
                    .any(|term| normalized.contains(term) || term.contains(normalized))
            }
            Self::Date => NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").is_ok(),
            Self::Time => NaiveTime::parse_from_str(value.trim(), "%H:%M").is_ok(),
            Self::Address => value.trim().len() >= MIN_ADDRESS_LENGTH,
        }
    }
}

/// Schema for a single slot to collect
#[derive(Debug, Clone)]
pub struct SlotDefinition {
    pub name: &'static str,
    pub display_name: &'static str,
    pub required: bool,
    pub validator: Option<SlotValidator>,
    pub prompt_hint: &'static str,
    /// Per-slot retry limit; `None` falls back to the configured default
    pub max_retries: Option<u32>,
    /// Whether the value must be read back at the confirmation gate
    pub confirmation_required: bool,
}

/// Declared order defines the default question order.
static SLOT_DEFINITIONS: Lazy<Vec<SlotDefinition>> = Lazy::new(|| {
    vec![
        SlotDefinition {
            name: "customer_name",
            display_name: "name",
            required: true,
            validator: Some(SlotValidator::Name),
            prompt_hint: "Ask for their full name",
            max_retries: None,
            confirmation_required: true,
        },
        SlotDefinition {
            name: "customer_phone",
            display_name: "phone number",
            required: true,
            validator: Some(SlotValidator::Phone),
            prompt_hint: "Ask for a callback number",
            max_retries: None,
            confirmation_required: true,
        },
        SlotDefinition {
            name: "service_type",
            display_name: "type of service",
            required: true,
            validator: Some(SlotValidator::Service),
            prompt_hint: "Ask what service they need",
            max_retries: None,
            confirmation_required: true,
        },
        SlotDefinition {
            name: "preferred_date",
            display_name: "preferred date",
            required: true,
            validator: Some(SlotValidator::Date),
            prompt_hint: "Ask when they'd like the appointment",
            max_retries: None,
            confirmation_required: true,
        },
        SlotDefinition {
            name: "preferred_time",
            display_name: "preferred time",
            required: true,
            validator: Some(SlotValidator::Time),
            prompt_hint: "Ask what time works best",
            max_retries: None,
            confirmation_required: true,
        },
        SlotDefinition {
            name: "customer_address",
            display_name: "service address",
            required: true,
            validator: Some(SlotValidator::Address),
            prompt_hint: "Ask for the address where the service is needed",
            max_retries: None,
            confirmation_required: true,
        },
        SlotDefinition {
            name: "job_description",
            display_name: "job description",
            required: false,
            validator: None,
            prompt_hint: "Ask them to briefly describe the issue",
            max_retries: None,
            confirmation_required: false,
        },
    ]
});

/// Current state and history of a collected slot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotValue {
    pub raw_value: Option<String>,
    pub normalized_value: Option<String>,
    pub status: SlotStatus,
    pub attempts: u32,
    /// Previous raw values replaced by corrections
    pub correction_history: Vec<String>,
}

impl Default for SlotStatus {
    fn default() -> Self {
        Self::Empty
    }
}

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Unknown slot: {0}")]
    UnknownSlot(String),

    /// Recoverable: the caller can retry until the slot's attempts run out.
    #[error("The {field} '{value}' doesn't look right.")]
    ValidationRejected { field: &'static str, value: String },
}

/// Slot collection statistics for evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotStats {
    pub total_attempts: u32,
    pub total_corrections: usize,
    pub slots_filled: usize,
    pub slots_required: usize,
    pub fill_rate: f64,
}

/// Manages slot collection with validation and confirmation gates
///
/// The booking step refuses to execute unless every required slot has
/// reached `Confirmed` status via the explicit confirmation gate.
#[derive(Debug)]
pub struct SlotManager {
    slots: HashMap<&'static str, SlotValue>,
    max_retries: u32,
}

impl SlotManager {
    pub fn new(guardrails: &GuardrailSettings) -> Self {
        Self {
            slots: SLOT_DEFINITIONS
                .iter()
                .map(|defn| (defn.name, SlotValue::default()))
                .collect(),
            max_retries: guardrails.max_slot_retries,
        }
    }

    fn definition(name: &str) -> Result<&'static SlotDefinition, SlotError> {
        SLOT_DEFINITIONS
            .iter()
            .find(|defn| defn.name == name)
            .ok_or_else(|| SlotError::UnknownSlot(name.to_string()))
    }

    /// Slot-specific normalization rules
    fn normalize(name: &str, value: &str) -> String {
        let value = value.trim();
        match name {
            "customer_phone" => normalize_phone(value),
            "service_type" => value.to_lowercase(),
            "customer_name" => title_case(value),
            _ => value.to_string(),
        }
    }

    /// Set a slot value with validation
    ///
    /// Returns the read-back message when validation passed and the value
    /// was normalized. A failed validation is a recoverable
    /// [`SlotError::ValidationRejected`]; the raw value is kept, the slot
    /// moves to `Collected`, and the attempt is counted either way.
    pub fn set_slot(&mut self, name: &str, raw_value: &str) -> Result<String, SlotError> {
        let defn = Self::definition(name)?;
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| SlotError::UnknownSlot(name.to_string()))?;
        slot.raw_value = Some(raw_value.to_string());
        slot.attempts += 1;

        if let Some(validator) = defn.validator {
            if !validator.validate(raw_value) {
                slot.status = SlotStatus::Collected;
                tracing::debug!(slot = name, value = raw_value, "slot validation failed");
                return Err(SlotError::ValidationRejected {
                    field: defn.display_name,
                    value: raw_value.to_string(),
                });
            }
        }

        let normalized = Self::normalize(name, raw_value);
        slot.normalized_value = Some(normalized.clone());
        slot.status = SlotStatus::Validated;
        tracing::debug!(slot = name, value = %normalized, "slot set");
        Ok(format!("Got {}: {}", defn.display_name, normalized))
    }

    /// Handle a correction, preserving the previous value in history
    pub fn correct_slot(&mut self, name: &str, new_value: &str) -> Result<String, SlotError> {
        let slot = self
            .slots
            .get_mut(name)
            .ok_or_else(|| SlotError::UnknownSlot(name.to_string()))?;
        if let Some(previous) = slot.raw_value.take() {
            slot.correction_history.push(previous);
        }
        let message = self.set_slot(name, new_value)?;
        // Track that this value replaced an earlier one.
        if let Some(slot) = self.slots.get_mut(name) {
            if !slot.correction_history.is_empty() {
                slot.status = SlotStatus::Corrected;
            }
        }
        Ok(message)
    }

    /// Mark all validated and corrected slots confirmed after explicit
    /// caller approval. Safe to call repeatedly.
    pub fn confirm_all(&mut self) {
        for slot in self.slots.values_mut() {
            if matches!(slot.status, SlotStatus::Validated | SlotStatus::Corrected) {
                slot.status = SlotStatus::Confirmed;
            }
        }
        tracing::info!("all slots confirmed by caller");
    }

    /// Read-back text for the confirmation gate
    pub fn confirmation_summary(&self) -> String {
        let lines: Vec<String> = SLOT_DEFINITIONS
            .iter()
            .filter(|defn| defn.confirmation_required)
            .filter_map(|defn| {
                self.slots[defn.name]
                    .normalized_value
                    .as_ref()
                    .map(|value| format!("  {}: {}", defn.display_name, value))
            })
            .collect();
        format!("Here's what I have:\n{}", lines.join("\n"))
    }

    /// The next required slot that hasn't been filled
    pub fn next_empty_slot(&self) -> Option<&'static SlotDefinition> {
        SLOT_DEFINITIONS
            .iter()
            .find(|defn| defn.required && self.slots[defn.name].status == SlotStatus::Empty)
    }

    /// All required slots still unfilled
    pub fn missing_slots(&self) -> Vec<&'static SlotDefinition> {
        SLOT_DEFINITIONS
            .iter()
            .filter(|defn| defn.required && self.slots[defn.name].status == SlotStatus::Empty)
            .collect()
    }

    /// Whether every required slot has at least been validated
    pub fn all_required_filled(&self) -> bool {
        SLOT_DEFINITIONS
            .iter()
            .filter(|defn| defn.required)
            .all(|defn| {
                matches!(
                    self.slots[defn.name].status,
                    SlotStatus::Validated | SlotStatus::Confirmed | SlotStatus::Corrected
                )
            })
    }

    /// Whether every required slot passed the confirmation gate
    pub fn all_confirmed(&self) -> bool {
        SLOT_DEFINITIONS
            .iter()
            .filter(|defn| defn.required)
            .all(|defn| self.slots[defn.name].status == SlotStatus::Confirmed)
    }

    /// Whether a slot has used up its validation attempts
    ///
    /// The limit is the slot's own override when the schema declares one,
    /// otherwise the configured default.
    pub fn has_exceeded_retries(&self, name: &str) -> Result<bool, SlotError> {
        let defn = Self::definition(name)?;
        let slot = self
            .slots
            .get(name)
            .ok_or_else(|| SlotError::UnknownSlot(name.to_string()))?;
        let limit = defn.max_retries.unwrap_or(self.max_retries);
        Ok(slot.attempts >= limit)
    }

    /// The normalized value of a slot, if validated
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.slots
            .get(name)
            .and_then(|slot| slot.normalized_value.as_deref())
    }

    /// Export collected slot values as a flat map
    pub fn to_map(&self) -> HashMap<&'static str, String> {
        SLOT_DEFINITIONS
            .iter()
            .filter_map(|defn| {
                self.slots[defn.name]
                    .normalized_value
                    .clone()
                    .map(|value| (defn.name, value))
            })
            .collect()
    }

    /// Slot collection statistics for evaluation
    pub fn stats(&self) -> SlotStats {
        let total_attempts = self.slots.values().map(|s| s.attempts).sum();
        let total_corrections = self
            .slots
            .values()
            .map(|s| s.correction_history.len())
            .sum();
        let required: Vec<_> = SLOT_DEFINITIONS.iter().filter(|d| d.required).collect();
        let filled = required
            .iter()
            .filter(|defn| self.slots[defn.name].status != SlotStatus::Empty)
            .count();
        let slots_required = required.len();
        SlotStats {
            total_attempts,
            total_corrections,
            slots_filled: filled,
            slots_required,
            fill_rate: if slots_required > 0 {
                filled as f64 / slots_required as f64
            } else {
                0.0
            },
        }
    }
}

fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SlotManager {
        SlotManager::new(&GuardrailSettings::default())
    }

    #[test]
    fn test_normalize_phone_local() {
        assert_eq!(normalize_phone("0412 345 678"), "0412345678");
    }

    #[test]
    fn test_normalize_phone_international() {
        assert_eq!(normalize_phone("+61 (412) 345-678"), "+61412345678");
    }

    #[test]
    fn test_set_slot_validates_and_normalizes() {
        let mut slots = manager();
        let msg = slots.set_slot("customer_name", "john smith").unwrap();
        assert!(msg.contains("John Smith"));
        assert_eq!(slots.slot_value("customer_name"), Some("John Smith"));
    }

    #[test]
    fn test_set_slot_rejects_bad_phone() {
        let mut slots = manager();
        let err = slots.set_slot("customer_phone", "12345").unwrap_err();
        assert!(matches!(
            &err,
            SlotError::ValidationRejected { field, value }
                if *field == "phone number" && value == "12345"
        ));
        assert!(err.to_string().contains("doesn't look right"));
        assert_eq!(slots.slot_value("customer_phone"), None);
    }

    #[test]
    fn test_rejection_still_counts_the_attempt() {
        let mut slots = manager();
        assert!(slots.set_slot("customer_phone", "12345").is_err());
        assert_eq!(slots.stats().total_attempts, 1);
    }

    #[test]
    fn test_set_slot_unknown_name() {
        let mut slots = manager();
        assert!(matches!(
            slots.set_slot("favorite_color", "blue"),
            Err(SlotError::UnknownSlot(_))
        ));
    }

    #[test]
    fn test_date_and_time_validation() {
        let mut slots = manager();
        assert!(slots.set_slot("preferred_date", "2025-03-15").is_ok());
        assert!(slots.set_slot("preferred_date", "15/03/2025").is_err());
        assert!(slots.set_slot("preferred_time", "10:00").is_ok());
        assert!(slots.set_slot("preferred_time", "ten o'clock").is_err());
    }

    #[test]
    fn test_service_validation_uses_catalog_vocabulary() {
        let mut slots = manager();
        assert!(slots.set_slot("service_type", "Plumbing").is_ok());
        assert_eq!(slots.slot_value("service_type"), Some("plumbing"));
        assert!(slots.set_slot("service_type", "astrology reading").is_err());
    }

    #[test]
    fn test_retry_counting() {
        let mut slots = manager();
        assert!(slots.set_slot("customer_phone", "1").is_err());
        assert!(!slots.has_exceeded_retries("customer_phone").unwrap());
        assert!(slots.set_slot("customer_phone", "12").is_err());
        assert!(!slots.has_exceeded_retries("customer_phone").unwrap());
        assert!(slots.set_slot("customer_phone", "123").is_err());
        assert!(slots.has_exceeded_retries("customer_phone").unwrap());
    }

    #[test]
    fn test_retry_limit_defaults_from_settings() {
        let settings = GuardrailSettings {
            max_slot_retries: 2,
            ..GuardrailSettings::default()
        };
        let mut slots = SlotManager::new(&settings);
        assert!(slots.set_slot("customer_phone", "1").is_err());
        assert!(!slots.has_exceeded_retries("customer_phone").unwrap());
        assert!(slots.set_slot("customer_phone", "12").is_err());
        assert!(slots.has_exceeded_retries("customer_phone").unwrap());
    }

    #[test]
    fn test_next_empty_slot_follows_declared_order() {
        let mut slots = manager();
        assert_eq!(slots.next_empty_slot().unwrap().name, "customer_name");
        slots.set_slot("customer_name", "Jane Doe").unwrap();
        assert_eq!(slots.next_empty_slot().unwrap().name, "customer_phone");
        assert_eq!(slots.missing_slots().len(), 5);
    }

    #[test]
    fn test_correction_preserves_history() {
        let mut slots = manager();
        slots.set_slot("preferred_date", "2025-03-15").unwrap();
        slots.correct_slot("preferred_date", "2025-03-16").unwrap();
        assert_eq!(slots.slot_value("preferred_date"), Some("2025-03-16"));
        assert_eq!(slots.stats().total_corrections, 1);
    }

    #[test]
    fn test_confirmation_gate() {
        let mut slots = manager();
        slots.set_slot("customer_name", "John Smith").unwrap();
        slots.set_slot("customer_phone", "0412345678").unwrap();
        slots.set_slot("service_type", "plumbing").unwrap();
        slots.set_slot("preferred_date", "2025-03-15").unwrap();
        slots.set_slot("preferred_time", "10:00").unwrap();
        slots.set_slot("customer_address", "42 Wallaby Way, Sydney").unwrap();

        assert!(slots.all_required_filled());
        assert!(!slots.all_confirmed());

        slots.confirm_all();
        assert!(slots.all_confirmed());

        // Repeating the gate is a no-op.
        slots.confirm_all();
        assert!(slots.all_confirmed());
    }

    #[test]
    fn test_optional_slot_not_in_confirmation_summary() {
        let mut slots = manager();
        slots.set_slot("customer_name", "John Smith").unwrap();
        slots.set_slot("job_description", "Leaking tap").unwrap();
        let summary = slots.confirmation_summary();
        assert!(summary.contains("name: John Smith"));
        assert!(!summary.contains("Leaking tap"));
    }

    #[test]
    fn test_optional_slot_does_not_block_required_filled() {
        let mut slots = manager();
        for (name, value) in [
            ("customer_name", "John Smith"),
            ("customer_phone", "0412345678"),
            ("service_type", "plumbing"),
            ("preferred_date", "2025-03-15"),
            ("preferred_time", "10:00"),
            ("customer_address", "42 Wallaby Way, Sydney"),
        ] {
            slots.set_slot(name, value).unwrap();
        }
        assert!(slots.all_required_filled());
        assert!(slots.next_empty_slot().is_none());
    }

    #[test]
    fn test_stats() {
        let mut slots = manager();
        slots.set_slot("customer_name", "John Smith").unwrap();
        assert!(slots.set_slot("customer_phone", "bad").is_err());
        slots.set_slot("customer_phone", "0412345678").unwrap();
        let stats = slots.stats();
        assert_eq!(stats.total_attempts, 3);
        assert_eq!(stats.slots_filled, 2);
        assert_eq!(stats.slots_required, 6);
        assert!((stats.fill_rate - 2.0 / 6.0).abs() < 1e-9);
    }
}
