//! Mock customer lookup system
//!
//! In production this would query a CRM (HubSpot, Salesforce,
//! ServiceTitan customer records) to identify returning callers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Customer record as stored in the directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub previous_bookings: u32,
    pub notes: String,
}

/// In-memory customer directory seeded with two returning customers
#[derive(Debug)]
pub struct CustomerDirectory {
    customers: HashMap<String, CustomerRecord>,
}

fn clean_phone(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    // Australian international prefix folds back to the local form.
    if let Some(rest) = cleaned.strip_prefix("+61") {
        format!("0{}", rest)
    } else {
        cleaned
    }
}

impl CustomerDirectory {
    pub fn new() -> Self {
        let mut customers = HashMap::new();
        customers.insert(
            "0412345678".to_string(),
            CustomerRecord {
                name: "John Smith".to_string(),
                phone: "0412345678".to_string(),
                email: "john.smith@email.com".to_string(),
                address: "42 Oak Avenue, Richmond VIC 3121".to_string(),
                previous_bookings: 3,
                notes: "Preferred morning appointments. Has a large dog.".to_string(),
            },
        );
        customers.insert(
            "0498765432".to_string(),
            CustomerRecord {
                name: "Sarah Johnson".to_string(),
                phone: "0498765432".to_string(),
                email: "sarah.j@email.com".to_string(),
                address: "15 Elm Street, South Yarra VIC 3141".to_string(),
                previous_bookings: 1,
                notes: String::new(),
            },
        );
        Self { customers }
    }

    /// Look up a customer by phone number
    pub fn lookup_customer(&self, phone: &str) -> Option<&CustomerRecord> {
        let result = self.customers.get(&clean_phone(phone));
        if let Some(record) = result {
            tracing::debug!(name = %record.name, "returning customer found");
        }
        result
    }

    /// Create a new customer record
    pub fn create_customer(
        &mut self,
        name: &str,
        phone: &str,
        email: Option<&str>,
        address: Option<&str>,
    ) -> &CustomerRecord {
        let cleaned = clean_phone(phone);
        let record = CustomerRecord {
            name: name.to_string(),
            phone: cleaned.clone(),
            email: email.unwrap_or_default().to_string(),
            address: address.unwrap_or_default().to_string(),
            previous_bookings: 0,
            notes: String::new(),
        };
        tracing::info!(name, phone = %cleaned, "new customer created");
        self.customers.entry(cleaned).or_insert(record)
    }
}

impl Default for CustomerDirectory {
    fn default() -> Self {
        Self::new()
    }
}
