//! Core types for the call-flow orchestrator
//!
//! This crate provides the vocabulary shared across all other crates:
//! - Conversation states and transition triggers
//! - Guardrail results with ordered severity
//! - Per-session data carried between turns

pub mod guardrail;
pub mod session;
pub mod state;

pub use guardrail::{max_severity, GuardrailResult, Severity, ViolationType};
pub use session::SessionData;
pub use state::{ConversationState, StateEntry, TransitionTrigger};
