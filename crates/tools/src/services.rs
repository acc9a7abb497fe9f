//! Service catalog with pricing, durations, and descriptions

use once_cell::sync::Lazy;
use serde::Serialize;

/// Full catalog entry for one service line
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price_range: &'static str,
    pub call_out_fee: &'static str,
    pub typical_duration: &'static str,
    pub emergency_available: bool,
}

/// Compact listing entry returned by [`get_all_services`]
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSummary {
    pub id: &'static str,
    pub name: &'static str,
    pub price_range: &'static str,
}

static SERVICE_CATALOG: Lazy<Vec<ServiceInfo>> = Lazy::new(|| {
    vec![
        ServiceInfo {
            id: "plumbing",
            name: "Plumbing Service",
            description: "All plumbing repairs, installations, and maintenance including taps, toilets, pipes, and hot water systems.",
            price_range: "$120 - $350",
            call_out_fee: "$89",
            typical_duration: "1-3 hours",
            emergency_available: true,
        },
        ServiceInfo {
            id: "electrical",
            name: "Electrical Service",
            description: "Electrical repairs, installations, safety inspections, switchboard upgrades, and lighting.",
            price_range: "$150 - $400",
            call_out_fee: "$99",
            typical_duration: "1-4 hours",
            emergency_available: true,
        },
        ServiceInfo {
            id: "hvac",
            name: "HVAC Service",
            description: "Heating, ventilation, and air conditioning installation, repair, and maintenance.",
            price_range: "$150 - $500",
            call_out_fee: "$99",
            typical_duration: "1-4 hours",
            emergency_available: false,
        },
        ServiceInfo {
            id: "general handyman",
            name: "General Handyman",
            description: "General repairs, furniture assembly, painting, door and window repairs.",
            price_range: "$80 - $250",
            call_out_fee: "$69",
            typical_duration: "1-2 hours",
            emergency_available: false,
        },
        ServiceInfo {
            id: "drain cleaning",
            name: "Drain Cleaning",
            description: "Blocked drains, CCTV drain inspection, and high-pressure jet cleaning.",
            price_range: "$150 - $400",
            call_out_fee: "$89",
            typical_duration: "1-2 hours",
            emergency_available: true,
        },
        ServiceInfo {
            id: "emergency repair",
            name: "Emergency Repair",
            description: "24/7 emergency service for burst pipes, gas leaks, electrical faults, and flooding.",
            price_range: "$250 - $600",
            call_out_fee: "$149",
            typical_duration: "1-4 hours",
            emergency_available: true,
        },
    ]
});

// Alias checks run in declaration order; more specific phrases first where
// they share a substring.
static SERVICE_ALIASES: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("plumber", "plumbing"),
        ("pipes", "plumbing"),
        ("toilet", "plumbing"),
        ("tap", "plumbing"),
        ("hot water", "plumbing"),
        ("water heater", "plumbing"),
        ("electrician", "electrical"),
        ("wiring", "electrical"),
        ("power", "electrical"),
        ("lights", "electrical"),
        ("switchboard", "electrical"),
        ("heating", "hvac"),
        ("cooling", "hvac"),
        ("air conditioning", "hvac"),
        ("aircon", "hvac"),
        ("ac", "hvac"),
        ("handyman", "general handyman"),
        ("painting", "general handyman"),
        ("drain", "drain cleaning"),
        ("blocked drain", "drain cleaning"),
        ("clogged", "drain cleaning"),
        ("emergency", "emergency repair"),
        ("urgent", "emergency repair"),
        ("burst pipe", "emergency repair"),
        ("gas leak", "emergency repair"),
        ("flooding", "emergency repair"),
    ]
});

/// All recognized service terms (catalog IDs plus alias keys)
///
/// Single source of truth for service validation: slot validators and
/// the scope guardrail both consult this list.
pub fn get_valid_service_terms() -> Vec<&'static str> {
    SERVICE_CATALOG
        .iter()
        .map(|s| s.id)
        .chain(SERVICE_ALIASES.iter().map(|(alias, _)| *alias))
        .collect()
}

/// All services with basic info
pub fn get_all_services() -> Vec<ServiceSummary> {
    SERVICE_CATALOG
        .iter()
        .map(|s| ServiceSummary {
            id: s.id,
            name: s.name,
            price_range: s.price_range,
        })
        .collect()
}

/// Full details for a specific service, matched loosely by ID
pub fn get_service_details(service_id: &str) -> Option<&'static ServiceInfo> {
    let normalized = service_id.to_lowercase();
    let normalized = normalized.trim();
    SERVICE_CATALOG
        .iter()
        .find(|s| s.id == normalized || normalized.contains(s.id) || s.id.contains(normalized))
}

/// Match a caller query to a service ID
pub fn match_service(query: &str) -> Option<&'static str> {
    let normalized = query.to_lowercase();
    let normalized = normalized.trim();
    for (alias, service_id) in SERVICE_ALIASES.iter() {
        if normalized.contains(alias) {
            return Some(service_id);
        }
    }
    SERVICE_CATALOG
        .iter()
        .find(|s| normalized.contains(s.id) || s.id.contains(normalized))
        .map(|s| s.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_six_services() {
        assert_eq!(get_all_services().len(), 6);
    }

    #[test]
    fn test_match_service_by_alias() {
        assert_eq!(match_service("my toilet is broken"), Some("plumbing"));
        assert_eq!(match_service("need an electrician"), Some("electrical"));
        assert_eq!(match_service("the aircon died"), Some("hvac"));
    }

    #[test]
    fn test_match_service_by_id() {
        assert_eq!(match_service("plumbing"), Some("plumbing"));
        assert_eq!(match_service("I want drain cleaning"), Some("drain cleaning"));
    }

    #[test]
    fn test_match_service_no_match() {
        assert_eq!(match_service("lawn mowing"), None);
    }

    #[test]
    fn test_emergency_aliases_map_to_emergency_repair() {
        assert_eq!(match_service("gas leak"), Some("emergency repair"));
        assert_eq!(match_service("burst pipe at home"), Some("emergency repair"));
    }

    #[test]
    fn test_get_service_details() {
        let details = get_service_details("Plumbing").unwrap();
        assert_eq!(details.name, "Plumbing Service");
        assert!(details.emergency_available);
        assert!(get_service_details("astrology").is_none());
    }

    #[test]
    fn test_valid_terms_include_ids_and_aliases() {
        let terms = get_valid_service_terms();
        assert!(terms.contains(&"hvac"));
        assert!(terms.contains(&"blocked drain"));
        assert_eq!(terms.len(), 6 + 26);
    }
}
