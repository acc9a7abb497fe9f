//! Multi-layer guardrail system for controlling agent behavior
//!
//! Four independent layers, each checking a different concern:
//! scope (services and topics), hallucination (unverified claims),
//! persona (voice style and AI self-references), and escalation
//! (emergencies and caller frustration). The pipeline composes them
//! into pre-model and post-model checks.

use callflow_core::{GuardrailResult, Severity, ViolationType};
use callflow_tools::services::get_valid_service_terms;

/// Validates that conversations stay within defined service boundaries
#[derive(Debug, Default)]
pub struct ScopeGuardrail;

const OUT_OF_SCOPE_TOPICS: &[&str] = &[
    "medical advice",
    "legal advice",
    "financial advice",
    "competitor",
    "political",
    "religious",
    "investment",
    "cryptocurrency",
    "dating",
];

impl ScopeGuardrail {
    pub fn check_service_scope(&self, service: &str) -> GuardrailResult {
        let normalized = service.to_lowercase();
        let normalized = normalized.trim();
        for valid in get_valid_service_terms() {
            if normalized.contains(valid) || valid.contains(normalized) {
                return GuardrailResult::pass();
            }
        }
        GuardrailResult::violation(
            ViolationType::OutOfScopeService,
            format!("'{}' is not in our service catalog.", service),
            Severity::Warning,
        )
    }

    pub fn check_topic_scope(&self, text: &str) -> GuardrailResult {
        let lower = text.to_lowercase();
        for topic in OUT_OF_SCOPE_TOPICS {
            if lower.contains(topic) {
                return GuardrailResult::violation(
                    ViolationType::OutOfScopeTopic,
                    format!("Topic '{}' is outside our scope.", topic),
                    Severity::Block,
                );
            }
        }
        GuardrailResult::pass()
    }
}

/// Detects potentially fabricated claims in agent responses
#[derive(Debug, Default)]
pub struct HallucinationGuardrail;

const FORBIDDEN_CLAIMS: &[&str] = &[
    "guarantee",
    "warranty",
    "we guarantee",
    "years of experience",
    "award-winning",
    "best in the city",
    "cheapest",
    "lowest price",
    "fully insured",
    "fully licensed",
];

impl HallucinationGuardrail {
    pub fn check_response(&self, response_text: &str) -> GuardrailResult {
        let lower = response_text.to_lowercase();
        for claim in FORBIDDEN_CLAIMS {
            if lower.contains(claim) {
                tracing::warn!(claim, "hallucination detected");
                return GuardrailResult::violation(
                    ViolationType::PotentialHallucination,
                    format!("Response contains unverified claim: '{}'.", claim),
                    Severity::Block,
                );
            }
        }
        GuardrailResult::pass()
    }
}

/// Enforces consistent voice persona and prevents formatting leaks
#[derive(Debug, Default)]
pub struct PersonaGuardrail;

const FORBIDDEN_PATTERNS: &[&str] = &[
    "as an ai",
    "as a language model",
    "i'm just a computer",
    "i don't have feelings",
    "i'm not sure if",
    "i think maybe",
    "i cannot",
    "i'm unable to",
];

// Markup that a text renderer would format but a voice channel reads aloud.
const FORMATTING_VIOLATIONS: &[&str] = &["- ", "* ", "1. ", "## ", "**", "```"];

impl PersonaGuardrail {
    pub fn check_persona(&self, response_text: &str) -> GuardrailResult {
        let lower = response_text.to_lowercase();
        for pattern in FORBIDDEN_PATTERNS {
            if lower.contains(pattern) {
                return GuardrailResult::violation(
                    ViolationType::PersonaBreak,
                    format!("Response breaks persona with: '{}'.", pattern),
                    Severity::Warning,
                );
            }
        }
        GuardrailResult::pass()
    }

    pub fn check_formatting(&self, response_text: &str) -> GuardrailResult {
        for fmt in FORMATTING_VIOLATIONS {
            if response_text.contains(fmt) {
                return GuardrailResult::violation(
                    ViolationType::FormattingViolation,
                    format!("Voice response should not contain '{}' formatting.", fmt),
                    Severity::Warning,
                );
            }
        }
        GuardrailResult::pass()
    }
}

/// Detects conditions requiring immediate escalation to a human
#[derive(Debug)]
pub struct EscalationGuardrail {
    confusion_threshold: u32,
}

const EMERGENCY_KEYWORDS: &[&str] = &[
    "gas leak",
    "flooding",
    "flood",
    "fire",
    "sparking",
    "electrocution",
    "burst pipe",
    "no hot water emergency",
    "carbon monoxide",
    "smell gas",
    "water everywhere",
];

const FRUSTRATION_KEYWORDS: &[&str] = &[
    "manager",
    "supervisor",
    "speak to a person",
    "real person",
    "human",
    "unacceptable",
    "lawsuit",
    "ridiculous",
    "useless",
    "worst service",
    "i already told you",
];

impl EscalationGuardrail {
    pub fn new(confusion_threshold: u32) -> Self {
        Self {
            confusion_threshold,
        }
    }

    pub fn check_escalation_needed(&self, user_message: &str, error_count: u32) -> GuardrailResult {
        let lower = user_message.to_lowercase();

        for keyword in EMERGENCY_KEYWORDS {
            if lower.contains(keyword) {
                tracing::info!(keyword, "emergency keyword detected");
                return GuardrailResult::violation(
                    ViolationType::Emergency,
                    format!("Emergency detected: '{}'.", keyword),
                    Severity::Escalate,
                );
            }
        }

        for keyword in FRUSTRATION_KEYWORDS {
            if lower.contains(keyword) {
                tracing::info!(keyword, "frustration keyword detected");
                return GuardrailResult::violation(
                    ViolationType::CallerFrustration,
                    format!("Caller frustration detected: '{}'.", keyword),
                    Severity::Escalate,
                );
            }
        }

        if error_count >= self.confusion_threshold {
            return GuardrailResult::violation(
                ViolationType::RepeatedConfusion,
                format!(
                    "Error count ({}) exceeds threshold ({}).",
                    error_count, self.confusion_threshold
                ),
                Severity::Escalate,
            );
        }

        GuardrailResult::pass()
    }
}

/// Composes all guardrails into pre-model and post-model check pipelines
#[derive(Debug)]
pub struct GuardrailPipeline {
    pub scope: ScopeGuardrail,
    pub hallucination: HallucinationGuardrail,
    pub persona: PersonaGuardrail,
    pub escalation: EscalationGuardrail,
}

impl GuardrailPipeline {
    pub fn new(confusion_threshold: u32) -> Self {
        Self {
            scope: ScopeGuardrail,
            hallucination: HallucinationGuardrail,
            persona: PersonaGuardrail,
            escalation: EscalationGuardrail::new(confusion_threshold),
        }
    }

    /// Pre-model: check caller input for escalation triggers and scope
    /// violations. Returns only failing results.
    pub fn check_user_input(&self, text: &str, error_count: u32) -> Vec<GuardrailResult> {
        [
            self.escalation.check_escalation_needed(text, error_count),
            self.scope.check_topic_scope(text),
        ]
        .into_iter()
        .filter(|r| !r.passed)
        .collect()
    }

    /// Post-model: check a proposed reply for hallucinations, persona
    /// breaks, and formatting leaks. Returns only failing results.
    pub fn check_agent_response(&self, text: &str) -> Vec<GuardrailResult> {
        [
            self.hallucination.check_response(text),
            self.persona.check_persona(text),
            self.persona.check_formatting(text),
        ]
        .into_iter()
        .filter(|r| !r.passed)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> GuardrailPipeline {
        GuardrailPipeline::new(3)
    }

    #[test]
    fn test_service_scope_accepts_catalog_terms() {
        let scope = ScopeGuardrail;
        assert!(scope.check_service_scope("plumbing").passed);
        assert!(scope.check_service_scope("blocked drain").passed);
    }

    #[test]
    fn test_service_scope_warns_on_unknown() {
        let scope = ScopeGuardrail;
        let result = scope.check_service_scope("pool cleaning");
        assert!(!result.passed);
        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(result.violation_type, Some(ViolationType::OutOfScopeService));
    }

    #[test]
    fn test_topic_scope_blocks_off_topic() {
        let scope = ScopeGuardrail;
        let result = scope.check_topic_scope("Can you give me legal advice about my landlord?");
        assert!(!result.passed);
        assert_eq!(result.severity, Severity::Block);
    }

    #[test]
    fn test_hallucination_blocks_absolute_claims() {
        let guard = HallucinationGuardrail;
        let result = guard.check_response("We guarantee the lowest price in town.");
        assert!(!result.passed);
        assert_eq!(
            result.violation_type,
            Some(ViolationType::PotentialHallucination)
        );
        assert!(guard.check_response("A technician can look at that for you.").passed);
    }

    #[test]
    fn test_persona_flags_ai_reference() {
        let guard = PersonaGuardrail;
        let result = guard.check_persona("As an AI, I can't smell gas.");
        assert!(!result.passed);
        assert_eq!(result.violation_type, Some(ViolationType::PersonaBreak));
    }

    #[test]
    fn test_formatting_flags_markup() {
        let guard = PersonaGuardrail;
        let result = guard.check_formatting("Here are your options:\n- plumbing\n- electrical");
        assert!(!result.passed);
        assert_eq!(
            result.violation_type,
            Some(ViolationType::FormattingViolation)
        );
        assert!(guard.check_formatting("We offer plumbing and electrical.").passed);
    }

    #[test]
    fn test_emergency_keyword_escalates() {
        let result = pipeline().escalation.check_escalation_needed("I have a gas leak!", 0);
        assert!(!result.passed);
        assert_eq!(result.violation_type, Some(ViolationType::Emergency));
        assert_eq!(result.severity, Severity::Escalate);
    }

    #[test]
    fn test_frustration_keyword_escalates() {
        let result = pipeline()
            .escalation
            .check_escalation_needed("Let me speak to a person", 0);
        assert_eq!(result.violation_type, Some(ViolationType::CallerFrustration));
    }

    #[test]
    fn test_confusion_threshold() {
        let escalation = EscalationGuardrail::new(3);
        assert!(escalation.check_escalation_needed("the tap drips", 2).passed);
        let result = escalation.check_escalation_needed("the tap drips", 3);
        assert_eq!(result.violation_type, Some(ViolationType::RepeatedConfusion));
    }

    #[test]
    fn test_user_input_pipeline_returns_failures_only() {
        let results = pipeline().check_user_input("I need to book a plumber", 0);
        assert!(results.is_empty());

        let results = pipeline().check_user_input("I have a gas leak!", 0);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].severity, Severity::Escalate);
    }

    #[test]
    fn test_agent_response_pipeline() {
        let results = pipeline().check_agent_response("**Great news** - we guarantee it!");
        assert_eq!(results.len(), 2);
    }
}
