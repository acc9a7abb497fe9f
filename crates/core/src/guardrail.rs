//! Guardrail check results
//!
//! Every guardrail check produces a result the orchestrator uses to pick a
//! reply template. Severity is a closed, totally ordered set so precedence
//! (`Escalate > Block > Warning`) cannot silently regress.

use serde::{Deserialize, Serialize};

/// Severity of a failed guardrail check
///
/// Variant order defines precedence: later variants override earlier ones
/// when multiple checks fail in the same turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Can proceed with caution
    Warning,
    /// Reply must be replaced, no state mutation
    Block,
    /// Hand the caller to a human
    Escalate,
}

/// Category of guardrail violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    /// Requested service is not in the catalog vocabulary
    OutOfScopeService,
    /// Caller raised a topic outside the business scope
    OutOfScopeTopic,
    /// Generated text contains an unverifiable absolute claim
    PotentialHallucination,
    /// Generated text discloses the agent is an AI
    PersonaBreak,
    /// Generated text contains markup unsuitable for voice
    FormattingViolation,
    /// Emergency vocabulary detected in caller input
    Emergency,
    /// Frustration vocabulary detected in caller input
    CallerFrustration,
    /// Running error count reached the confusion threshold
    RepeatedConfusion,
}

/// Outcome of a single guardrail check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuardrailResult {
    /// Whether the text passed the check
    pub passed: bool,
    /// Violation category when the check failed
    pub violation_type: Option<ViolationType>,
    /// Human-readable description of the violation
    pub message: Option<String>,
    /// Severity of the violation
    pub severity: Severity,
}

impl GuardrailResult {
    /// A passing result
    pub fn pass() -> Self {
        Self {
            passed: true,
            violation_type: None,
            message: None,
            severity: Severity::Warning,
        }
    }

    /// A failing result with the given category, message, and severity
    pub fn violation(
        violation_type: ViolationType,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            passed: false,
            violation_type: Some(violation_type),
            message: Some(message.into()),
            severity,
        }
    }
}

/// Highest severity among a set of failing results, if any
pub fn max_severity(results: &[GuardrailResult]) -> Option<Severity> {
    results
        .iter()
        .filter(|r| !r.passed)
        .map(|r| r.severity)
        .max()
}
