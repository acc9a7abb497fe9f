//! Finite state machine for deterministic conversation flow control
//!
//! Twelve conversation states and explicit transitions with triggers.
//! Every conversation follows a deterministic path through the state
//! graph, so agent behavior stays predictable on top of probabilistic
//! language-model outputs.
//!
//! ```
//! use callflow_agent::ConversationStateMachine;
//! use callflow_core::{ConversationState, TransitionTrigger};
//!
//! let mut sm = ConversationStateMachine::new();
//! sm.transition(TransitionTrigger::GreetingDelivered).unwrap();
//! assert_eq!(sm.current_state(), ConversationState::IntentDetection);
//! ```

use callflow_core::{ConversationState, StateEntry, TransitionTrigger};
use once_cell::sync::Lazy;
use thiserror::Error;

use callflow_core::ConversationState as S;
use callflow_core::TransitionTrigger as T;

/// A single valid state transition
#[derive(Debug, Clone, Copy)]
pub struct Transition {
    pub from_state: ConversationState,
    pub to_state: ConversationState,
    pub trigger: TransitionTrigger,
}

const fn t(from_state: S, to_state: S, trigger: T) -> Transition {
    Transition {
        from_state,
        to_state,
        trigger,
    }
}

/// The complete transition table
///
/// First match wins. A duplicate (from_state, trigger) pair would make a
/// row unreachable, so the table is rejected at first use if one exists.
static TRANSITIONS: Lazy<Vec<Transition>> = Lazy::new(|| {
    let table = vec![
        // Greeting
        t(S::Greeting, S::IntentDetection, T::GreetingDelivered),
        // Intent routing
        t(S::IntentDetection, S::ServiceSelection, T::IntentBook),
        t(S::IntentDetection, S::InfoResponse, T::IntentInfo),
        t(S::IntentDetection, S::Escalation, T::IntentEmergency),
        t(S::IntentDetection, S::Escalation, T::IntentHuman),
        t(S::IntentDetection, S::ErrorRecovery, T::IntentUnclear),
        // Booking flow
        t(S::ServiceSelection, S::SlotFilling, T::ServiceConfirmed),
        t(S::SlotFilling, S::SlotConfirmation, T::AllSlotsFilled),
        t(S::SlotFilling, S::ErrorRecovery, T::MaxRetries),
        // Confirmation gate
        t(S::SlotConfirmation, S::AvailabilityCheck, T::CallerConfirmed),
        t(S::SlotConfirmation, S::SlotFilling, T::CallerCorrected),
        // Availability
        t(S::AvailabilityCheck, S::BookingCreation, T::TimeSelected),
        t(S::AvailabilityCheck, S::SlotFilling, T::NoAvailability),
        t(S::AvailabilityCheck, S::Escalation, T::NoAvailabilityAtAll),
        // Booking result
        t(S::BookingCreation, S::Confirmation, T::BookingSuccess),
        t(S::BookingCreation, S::ErrorRecovery, T::BookingFailed),
        // Post-booking
        t(S::Confirmation, S::Farewell, T::Goodbye),
        // Info flow
        t(S::InfoResponse, S::IntentDetection, T::FollowUp),
        t(S::InfoResponse, S::ServiceSelection, T::WantsToBook),
        t(S::InfoResponse, S::Farewell, T::Satisfied),
        // Error recovery
        t(S::ErrorRecovery, S::SlotFilling, T::CorrectionReceived),
        t(S::ErrorRecovery, S::Escalation, T::RecoveryFailed),
        // Escalation
        t(S::Escalation, S::Farewell, T::HandoffComplete),
        // Terminal self-loop, so a repeated goodbye stays valid
        t(S::Farewell, S::Farewell, T::Goodbye),
    ];

    for (i, a) in table.iter().enumerate() {
        for b in &table[i + 1..] {
            assert!(
                !(a.from_state == b.from_state && a.trigger == b.trigger),
                "duplicate transition ({:?}, {:?}) in table",
                a.from_state,
                a.trigger,
            );
        }
    }

    table
});

#[derive(Error, Debug)]
pub enum StateMachineError {
    #[error(
        "No valid transition from '{state}' with trigger '{trigger}'. Valid triggers: {valid:?}"
    )]
    InvalidTransition {
        state: ConversationState,
        trigger: TransitionTrigger,
        valid: Vec<TransitionTrigger>,
    },
}

/// Deterministic state machine controlling conversation flow
///
/// Every transition must be explicitly defined. An action without a
/// corresponding valid transition is rejected with an error listing
/// what is allowed from the current state.
#[derive(Debug)]
pub struct ConversationStateMachine {
    current_state: ConversationState,
    history: Vec<StateEntry>,
    error_count: u32,
}

impl ConversationStateMachine {
    pub fn new() -> Self {
        Self {
            current_state: ConversationState::Greeting,
            history: vec![StateEntry::new(ConversationState::Greeting, None)],
            error_count: 0,
        }
    }

    pub fn current_state(&self) -> ConversationState {
        self.current_state
    }

    /// Running count of entries into error recovery
    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    /// Execute a state transition, returning the new state
    pub fn transition(
        &mut self,
        trigger: TransitionTrigger,
    ) -> Result<ConversationState, StateMachineError> {
        let row = TRANSITIONS
            .iter()
            .find(|t| t.from_state == self.current_state && t.trigger == trigger);

        let row = match row {
            Some(row) => row,
            None => {
                return Err(StateMachineError::InvalidTransition {
                    state: self.current_state,
                    trigger,
                    valid: self.valid_triggers(),
                })
            }
        };

        let old_state = self.current_state;
        self.current_state = row.to_state;
        self.history
            .push(StateEntry::new(self.current_state, Some(trigger)));

        if row.to_state == ConversationState::ErrorRecovery {
            self.error_count += 1;
        }

        tracing::debug!(
            from = %old_state,
            to = %self.current_state,
            trigger = %trigger,
            "state transition"
        );
        Ok(self.current_state)
    }

    /// All triggers valid from the current state
    pub fn valid_triggers(&self) -> Vec<TransitionTrigger> {
        TRANSITIONS
            .iter()
            .filter(|t| t.from_state == self.current_state)
            .map(|t| t.trigger)
            .collect()
    }

    /// The full state transition history
    pub fn history(&self) -> &[StateEntry] {
        &self.history
    }

    /// Ordered list of state names visited
    pub fn state_trace(&self) -> Vec<&'static str> {
        self.history.iter().map(|e| e.state.as_str()).collect()
    }

    /// Whether the conversation has reached its terminal state
    pub fn is_terminal(&self) -> bool {
        self.current_state == ConversationState::Farewell
    }
}

impl Default for ConversationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
