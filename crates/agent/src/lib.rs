//! Conversation control core
//!
//! Deterministic orchestration layer for a phone receptionist: a finite
//! state machine gates the call flow, a slot manager runs the
//! collect-validate-confirm loop for booking details, and a guardrail
//! pipeline screens caller input and proposed replies. The turn
//! coordinator wires these together with the mock business backends.
//!
//! The control core never generates language on its own authority; it
//! decides whether a proposed transition or value is admissible and
//! tracks the structured state required to authorize a booking.

pub mod coordinator;
pub mod guardrails;
pub mod slots;
pub mod state_machine;

pub use coordinator::{ActivePersona, TurnCoordinator, TurnReply};
pub use guardrails::{
    EscalationGuardrail, GuardrailPipeline, HallucinationGuardrail, PersonaGuardrail,
    ScopeGuardrail,
};
pub use slots::{normalize_phone, SlotDefinition, SlotError, SlotManager, SlotStats, SlotStatus};
pub use state_machine::{ConversationStateMachine, StateMachineError, Transition};

use thiserror::Error;

/// Errors surfaced by the conversation control core
#[derive(Error, Debug)]
pub enum AgentError {
    #[error(transparent)]
    Transition(#[from] StateMachineError),

    #[error(transparent)]
    Slot(#[from] SlotError),

    /// Booking execution was reached without every required slot confirmed
    #[error("booking attempted before the caller confirmed all details")]
    UnconfirmedBooking,
}
