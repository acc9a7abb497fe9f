//! Mock booking creation system
//!
//! In production this would integrate with a CRM / scheduling platform.
//! The mock keeps records in memory and issues `BK-XXXXXX` references.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Rescheduled,
}

/// Full booking record stored in the system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRecord {
    pub booking_ref: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub service_type: String,
    pub date: String,
    pub time: String,
    pub address: String,
    pub job_description: String,
    pub technician: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Result from create, cancel, or reschedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BookingRecord>,
}

impl BookingResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            booking_ref: None,
            details: None,
        }
    }
}

/// Fields passed to [`BookingSystem::create_booking`]
#[derive(Debug, Clone, Default)]
pub struct BookingRequest {
    pub name: String,
    pub phone: String,
    pub service: String,
    pub date: String,
    pub time: String,
    pub address: String,
    pub description: Option<String>,
    pub technician: Option<String>,
}

/// In-memory booking store
#[derive(Debug, Default)]
pub struct BookingSystem {
    bookings: HashMap<String, BookingRecord>,
}

impl BookingSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new booking and return the confirmation details
    pub fn create_booking(&mut self, request: BookingRequest) -> BookingResult {
        let missing: Vec<&str> = [
            ("name", &request.name),
            ("phone", &request.phone),
            ("service", &request.service),
            ("date", &request.date),
            ("time", &request.time),
            ("address", &request.address),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| *field)
        .collect();

        if !missing.is_empty() {
            return BookingResult::failure(format!(
                "Cannot create booking - missing required fields: {}.",
                missing.join(", ")
            ));
        }

        let reference = format!(
            "BK-{}",
            &Uuid::new_v4().simple().to_string()[..6].to_uppercase()
        );

        let record = BookingRecord {
            booking_ref: reference.clone(),
            customer_name: request.name.clone(),
            customer_phone: request.phone,
            service_type: request.service.clone(),
            date: request.date.clone(),
            time: request.time.clone(),
            address: request.address,
            job_description: request.description.unwrap_or_default(),
            technician: request
                .technician
                .unwrap_or_else(|| "To be assigned".to_string()),
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        };

        let message = format!(
            "Booking confirmed. Reference number: {}. {} on {} at {}.",
            reference, request.service, request.date, request.time
        );
        tracing::info!(
            booking_ref = %reference,
            customer = %request.name,
            date = %request.date,
            time = %request.time,
            "booking created"
        );

        self.bookings.insert(reference.clone(), record.clone());

        BookingResult {
            success: true,
            message,
            booking_ref: Some(reference),
            details: Some(record),
        }
    }

    /// Cancel an existing booking by reference number
    pub fn cancel_booking(&mut self, booking_ref: &str) -> BookingResult {
        match self.bookings.get_mut(booking_ref) {
            None => BookingResult::failure(format!("Booking {} not found.", booking_ref)),
            Some(record) => {
                record.status = BookingStatus::Cancelled;
                tracing::info!(booking_ref, "booking cancelled");
                BookingResult {
                    success: true,
                    message: format!("Booking {} has been cancelled.", booking_ref),
                    booking_ref: Some(booking_ref.to_string()),
                    details: None,
                }
            }
        }
    }

    /// Reschedule an existing booking to a new date and time
    pub fn reschedule_booking(
        &mut self,
        booking_ref: &str,
        new_date: &str,
        new_time: &str,
    ) -> BookingResult {
        match self.bookings.get_mut(booking_ref) {
            None => BookingResult::failure(format!("Booking {} not found.", booking_ref)),
            Some(record) => {
                record.date = new_date.to_string();
                record.time = new_time.to_string();
                record.status = BookingStatus::Rescheduled;
                tracing::info!(booking_ref, new_date, new_time, "booking rescheduled");
                BookingResult {
                    success: true,
                    message: format!(
                        "Booking {} rescheduled to {} at {}.",
                        booking_ref, new_date, new_time
                    ),
                    booking_ref: Some(booking_ref.to_string()),
                    details: Some(record.clone()),
                }
            }
        }
    }

    /// Retrieve a booking by reference number
    pub fn get_booking(&self, booking_ref: &str) -> Option<&BookingRecord> {
        self.bookings.get(booking_ref)
    }
}
