//! Conversation states, transition triggers, and history entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// All possible states in a conversation lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    /// Opening line delivered to the caller
    #[default]
    Greeting,
    /// Working out what the caller wants
    IntentDetection,
    /// Narrowing down which service they need
    ServiceSelection,
    /// Collecting the booking fields one question at a time
    SlotFilling,
    /// Reading collected details back for caller approval
    SlotConfirmation,
    /// Checking the calendar for the requested date
    AvailabilityCheck,
    /// Executing the booking against the backend
    BookingCreation,
    /// Booking reference delivered, wrapping up
    Confirmation,
    /// Answering service and pricing questions
    InfoResponse,
    /// Emergency or human handoff in progress
    Escalation,
    /// Terminal state
    Farewell,
    /// Re-prompting after repeated misunderstanding
    ErrorRecovery,
}

impl ConversationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationState::Greeting => "greeting",
            ConversationState::IntentDetection => "intent_detection",
            ConversationState::ServiceSelection => "service_selection",
            ConversationState::SlotFilling => "slot_filling",
            ConversationState::SlotConfirmation => "slot_confirmation",
            ConversationState::AvailabilityCheck => "availability_check",
            ConversationState::BookingCreation => "booking_creation",
            ConversationState::Confirmation => "confirmation",
            ConversationState::InfoResponse => "info_response",
            ConversationState::Escalation => "escalation",
            ConversationState::Farewell => "farewell",
            ConversationState::ErrorRecovery => "error_recovery",
        }
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Events that cause state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionTrigger {
    GreetingDelivered,
    IntentBook,
    IntentInfo,
    IntentEmergency,
    IntentHuman,
    IntentUnclear,
    ServiceConfirmed,
    AllSlotsFilled,
    CallerConfirmed,
    CallerCorrected,
    TimeSelected,
    NoAvailability,
    NoAvailabilityAtAll,
    BookingSuccess,
    BookingFailed,
    Satisfied,
    FollowUp,
    WantsToBook,
    CorrectionReceived,
    RecoveryFailed,
    HandoffComplete,
    Goodbye,
    MaxRetries,
}

impl TransitionTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionTrigger::GreetingDelivered => "greeting_delivered",
            TransitionTrigger::IntentBook => "intent_book",
            TransitionTrigger::IntentInfo => "intent_info",
            TransitionTrigger::IntentEmergency => "intent_emergency",
            TransitionTrigger::IntentHuman => "intent_human",
            TransitionTrigger::IntentUnclear => "intent_unclear",
            TransitionTrigger::ServiceConfirmed => "service_confirmed",
            TransitionTrigger::AllSlotsFilled => "all_slots_filled",
            TransitionTrigger::CallerConfirmed => "caller_confirmed",
            TransitionTrigger::CallerCorrected => "caller_corrected",
            TransitionTrigger::TimeSelected => "time_selected",
            TransitionTrigger::NoAvailability => "no_availability",
            TransitionTrigger::NoAvailabilityAtAll => "no_availability_at_all",
            TransitionTrigger::BookingSuccess => "booking_success",
            TransitionTrigger::BookingFailed => "booking_failed",
            TransitionTrigger::Satisfied => "satisfied",
            TransitionTrigger::FollowUp => "follow_up",
            TransitionTrigger::WantsToBook => "wants_to_book",
            TransitionTrigger::CorrectionReceived => "correction_received",
            TransitionTrigger::RecoveryFailed => "recovery_failed",
            TransitionTrigger::HandoffComplete => "handoff_complete",
            TransitionTrigger::Goodbye => "goodbye",
            TransitionTrigger::MaxRetries => "max_retries",
        }
    }
}

impl std::fmt::Display for TransitionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Recorded history entry for a state visit
///
/// Entries are append-only and never mutated after the fact; the ordered
/// list is exported for audit and analytics consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateEntry {
    /// State that was entered
    pub state: ConversationState,
    /// Trigger that produced the entry; `None` only for the initial state
    pub trigger: Option<TransitionTrigger>,
    /// When the state was entered
    pub entered_at: DateTime<Utc>,
}

impl StateEntry {
    pub fn new(state: ConversationState, trigger: Option<TransitionTrigger>) -> Self {
        Self {
            state,
            trigger,
            entered_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&ConversationState::IntentDetection).unwrap();
        assert_eq!(json, "\"intent_detection\"");
    }

    #[test]
    fn test_trigger_display_matches_serde() {
        let json = serde_json::to_string(&TransitionTrigger::NoAvailabilityAtAll).unwrap();
        assert_eq!(
            json.trim_matches('"'),
            TransitionTrigger::NoAvailabilityAtAll.as_str()
        );
    }

    #[test]
    fn test_default_state_is_greeting() {
        assert_eq!(ConversationState::default(), ConversationState::Greeting);
    }

    #[test]
    fn test_state_entry_records_trigger() {
        let entry = StateEntry::new(
            ConversationState::IntentDetection,
            Some(TransitionTrigger::GreetingDelivered),
        );
        assert_eq!(entry.state, ConversationState::IntentDetection);
        assert_eq!(entry.trigger, Some(TransitionTrigger::GreetingDelivered));
    }
}
