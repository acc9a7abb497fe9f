//! Mock business backends for the call-flow orchestrator
//!
//! These stand in for the integrations a production deployment would use:
//! a scheduling API for availability, a CRM for customers, and a job
//! management platform for bookings. Each module exposes the same shapes
//! those integrations would, so swapping in real HTTP clients is a
//! drop-in change for the agent layer.

pub mod availability;
pub mod booking;
pub mod customer;
pub mod services;

pub use availability::{AvailabilityCalendar, AvailabilityResult, DateAvailability, TimeSlot};
pub use booking::{BookingRecord, BookingRequest, BookingResult, BookingStatus, BookingSystem};
pub use customer::{CustomerDirectory, CustomerRecord};
pub use services::{
    get_all_services, get_service_details, get_valid_service_terms, match_service, ServiceInfo,
    ServiceSummary,
};
