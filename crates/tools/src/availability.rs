//! Mock calendar availability system
//!
//! In production this would call a scheduling API (ServiceTitan, Jobber,
//! Housecall Pro). The mock generates a deterministic 14-day schedule
//! from a fixed seed so demos and tests see stable data.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

const SCHEDULE_DAYS: i64 = 14;
const AVAILABILITY_PROBABILITY: f64 = 0.7;
const SCHEDULE_SEED: u64 = 42;
const MAX_SLOTS_RETURNED: usize = 5;

/// A single available time slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    pub time: String,
    pub technician: String,
    pub date: String,
}

/// Result from [`AvailabilityCalendar::check_availability`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityResult {
    pub available: bool,
    pub slots: Vec<TimeSlot>,
    /// "YYYY-MM-DD HH:MM" fallback when the requested date has nothing
    pub next_available: Option<String>,
    pub message: String,
}

/// Summary of availability for a single date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateAvailability {
    pub date: String,
    pub day_name: String,
    pub slot_count: usize,
}

struct DaySchedule {
    day_name: String,
    times: Vec<String>,
}

fn technicians_for(service_type: &str) -> &'static [&'static str] {
    match service_type {
        "plumbing" => &["Mike T.", "Sarah L."],
        "electrical" => &["James K.", "Priya M."],
        "hvac" => &["Dave W.", "Lisa C."],
        "drain cleaning" => &["Mike T.", "Dave W."],
        "emergency repair" => &["Mike T.", "James K.", "Dave W."],
        _ => &["Tom R.", "Alex B."],
    }
}

/// Deterministic mock schedule over the next two weeks
///
/// Sundays are closed, Saturdays run reduced hours. Roughly 70% of
/// working-hour slots are open.
pub struct AvailabilityCalendar {
    schedule: BTreeMap<String, DaySchedule>,
    rng: StdRng,
}

impl AvailabilityCalendar {
    pub fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(SCHEDULE_SEED);
        let schedule = Self::generate_schedule(&mut rng, Local::now().date_naive());
        Self { schedule, rng }
    }

    /// Build a calendar anchored at a fixed date, for deterministic tests
    pub fn with_base_date(base: NaiveDate) -> Self {
        let mut rng = StdRng::seed_from_u64(SCHEDULE_SEED);
        let schedule = Self::generate_schedule(&mut rng, base);
        Self { schedule, rng }
    }

    fn generate_schedule(rng: &mut StdRng, base: NaiveDate) -> BTreeMap<String, DaySchedule> {
        let mut schedule = BTreeMap::new();
        for day_offset in 1..=SCHEDULE_DAYS {
            let date = base + Duration::days(day_offset);
            if date.weekday() == Weekday::Sun {
                continue;
            }

            let hours: &[u32] = if date.weekday() == Weekday::Sat {
                &[9, 10, 11, 12, 13]
            } else {
                &[8, 9, 10, 11, 13, 14, 15, 16, 17]
            };

            let times = hours
                .iter()
                .filter(|_| rng.gen::<f64>() < AVAILABILITY_PROBABILITY)
                .map(|h| format!("{:02}:00", h))
                .collect();

            schedule.insert(
                date.format("%Y-%m-%d").to_string(),
                DaySchedule {
                    day_name: date.format("%A").to_string(),
                    times,
                },
            );
        }
        schedule
    }

    /// Check appointment availability for a service on a given date
    ///
    /// When a preferred time is given and open, returns exactly that slot.
    /// Otherwise returns up to five open slots, or a next-available
    /// fallback when the date has none.
    pub fn check_availability(
        &mut self,
        service_type: &str,
        date: &str,
        preferred_time: Option<&str>,
    ) -> AvailabilityResult {
        let techs = technicians_for(service_type);

        let day = match self.schedule.get(date) {
            Some(day) => day,
            None => {
                return AvailabilityResult {
                    available: false,
                    slots: Vec::new(),
                    next_available: self.next_available(),
                    message: format!("No availability on {}.", date),
                }
            }
        };

        if let Some(time) = preferred_time {
            if day.times.iter().any(|t| t == time) {
                let tech = techs
                    .choose(&mut self.rng)
                    .copied()
                    .unwrap_or("To be assigned");
                return AvailabilityResult {
                    available: true,
                    slots: vec![TimeSlot {
                        time: time.to_string(),
                        technician: tech.to_string(),
                        date: date.to_string(),
                    }],
                    next_available: None,
                    message: format!("Available on {} at {} with {}.", date, time, tech),
                };
            }
        }

        if !day.times.is_empty() {
            let times: Vec<String> = day.times.iter().take(MAX_SLOTS_RETURNED).cloned().collect();
            let slots: Vec<TimeSlot> = times
                .into_iter()
                .map(|time| TimeSlot {
                    technician: techs
                        .choose(&mut self.rng)
                        .copied()
                        .unwrap_or("To be assigned")
                        .to_string(),
                    time,
                    date: date.to_string(),
                })
                .collect();
            let message = format!("{} time slots available on {}.", slots.len(), date);
            return AvailabilityResult {
                available: true,
                slots,
                next_available: None,
                message,
            };
        }

        AvailabilityResult {
            available: false,
            slots: Vec::new(),
            next_available: self.next_available(),
            message: format!("No slots available on {}.", date),
        }
    }

    /// The next N dates with at least one open slot
    pub fn available_dates(&self, limit: usize) -> Vec<DateAvailability> {
        self.schedule
            .iter()
            .filter(|(_, day)| !day.times.is_empty())
            .take(limit)
            .map(|(date, day)| DateAvailability {
                date: date.clone(),
                day_name: day.day_name.clone(),
                slot_count: day.times.len(),
            })
            .collect()
    }

    /// Earliest open slot as "YYYY-MM-DD HH:MM", if any exists
    pub fn next_available(&self) -> Option<String> {
        self.schedule
            .iter()
            .find(|(_, day)| !day.times.is_empty())
            .map(|(date, day)| format!("{} {}", date, day.times[0]))
    }
}

impl Default for AvailabilityCalendar {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_calendar() -> AvailabilityCalendar {
        // A Monday, so the schedule covers two full weeks of each day kind.
        AvailabilityCalendar::with_base_date(NaiveDate::from_ymd_opt(2025, 6, 2).unwrap())
    }

    #[test]
    fn test_sundays_are_closed() {
        let cal = fixed_calendar();
        assert!(!cal.schedule.contains_key("2025-06-08"));
        assert!(!cal.schedule.contains_key("2025-06-15"));
    }

    #[test]
    fn test_schedule_is_deterministic() {
        let a = fixed_calendar();
        let b = fixed_calendar();
        for (date, day) in &a.schedule {
            assert_eq!(day.times, b.schedule[date].times);
        }
    }

    #[test]
    fn test_unknown_date_offers_next_available() {
        let mut cal = fixed_calendar();
        let result = cal.check_availability("plumbing", "2030-01-01", None);
        assert!(!result.available);
        assert!(result.slots.is_empty());
        assert!(result.next_available.is_some());
    }

    #[test]
    fn test_returns_at_most_five_slots() {
        let mut cal = fixed_calendar();
        let dates: Vec<String> = cal.schedule.keys().cloned().collect();
        for date in dates {
            let result = cal.check_availability("electrical", &date, None);
            assert!(result.slots.len() <= 5);
        }
    }

    #[test]
    fn test_preferred_time_returns_single_slot() {
        let mut cal = fixed_calendar();
        let (date, time) = cal
            .schedule
            .iter()
            .find_map(|(d, day)| day.times.first().map(|t| (d.clone(), t.clone())))
            .unwrap();
        let result = cal.check_availability("plumbing", &date, Some(&time));
        assert!(result.available);
        assert_eq!(result.slots.len(), 1);
        assert_eq!(result.slots[0].time, time);
    }

    #[test]
    fn test_available_dates_respects_limit() {
        let cal = fixed_calendar();
        let dates = cal.available_dates(3);
        assert!(dates.len() <= 3);
        for entry in &dates {
            assert!(entry.slot_count > 0);
        }
    }

    #[test]
    fn test_next_available_is_earliest() {
        let cal = fixed_calendar();
        let next = cal.next_available().unwrap();
        let first_open = cal
            .schedule
            .iter()
            .find(|(_, day)| !day.times.is_empty())
            .map(|(date, day)| format!("{} {}", date, day.times[0]))
            .unwrap();
        assert_eq!(next, first_open);
    }
}
