//! Per-session data carried across turns

use serde::{Deserialize, Serialize};

/// Mutable session record owned by the coordinator for one call
///
/// Discarding the session is sufficient cleanup; no external handles are
/// held here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    /// Detected caller intent ("booking", "info", "emergency")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_time: Option<String>,
    /// Reference issued by the booking backend once created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_ref: Option<String>,
    /// Running count of misunderstandings, fed to the escalation guardrail
    pub error_count: u32,
}

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = SessionData::new();
        assert!(session.intent.is_none());
        assert!(session.booking_ref.is_none());
        assert_eq!(session.error_count, 0);
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let session = SessionData::new();
        let json = serde_json::to_string(&session).unwrap();
        assert_eq!(json, "{\"error_count\":0}");
    }
}
