use chrono::Datelike;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::appointment::is_slot_format;
use crate::utils::now_rfc3339;

const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

/// Recurring bookable window for one professional at one center. At most one
/// row per (professional, center) pair; writes are upserts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub id: String,
    pub professional_id: String,
    pub center_id: String,
    pub weekdays: Vec<String>,
    pub slots: Vec<String>,
    pub slot_minutes: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetAvailabilityRequest {
    pub center_id: String,
    pub weekdays: Vec<String>,
    pub slots: Vec<String>,
    pub slot_minutes: Option<i64>,
}

impl SetAvailabilityRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.center_id.trim().is_empty() {
            return Err("center_id is required".to_string());
        }
        if self.weekdays.is_empty() {
            return Err("At least one weekday is required".to_string());
        }
        for day in &self.weekdays {
            if !WEEKDAYS.contains(&day.as_str()) {
                return Err(format!("Unknown weekday: {}", day));
            }
        }
        if self.slots.is_empty() {
            return Err("At least one slot is required".to_string());
        }
        for slot in &self.slots {
            if !is_slot_format(slot) {
                return Err(format!("Slot must be formatted HH:MM: {}", slot));
            }
        }
        if let Some(minutes) = self.slot_minutes {
            if minutes <= 0 {
                return Err("slot_minutes must be positive".to_string());
            }
        }
        Ok(())
    }
}

impl Availability {
    pub fn new(professional_id: String, request: &SetAvailabilityRequest) -> Self {
        let now = now_rfc3339();
        let mut slots = request.slots.clone();
        slots.sort();
        slots.dedup();
        Self {
            id: Uuid::new_v4().to_string(),
            professional_id,
            center_id: request.center_id.clone(),
            weekdays: request.weekdays.clone(),
            slots,
            slot_minutes: request.slot_minutes.unwrap_or(30),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Whether the window recurs on the weekday of the given calendar date.
    pub fn covers_date(&self, date: &str) -> bool {
        let parsed = match chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => return false,
        };
        let day = match parsed.weekday() {
            chrono::Weekday::Mon => "mon",
            chrono::Weekday::Tue => "tue",
            chrono::Weekday::Wed => "wed",
            chrono::Weekday::Thu => "thu",
            chrono::Weekday::Fri => "fri",
            chrono::Weekday::Sat => "sat",
            chrono::Weekday::Sun => "sun",
        };
        self.weekdays.iter().any(|d| d == day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SetAvailabilityRequest {
        SetAvailabilityRequest {
            center_id: "c1".to_string(),
            weekdays: vec!["mon".to_string(), "wed".to_string()],
            slots: vec!["10:00".to_string(), "10:30".to_string()],
            slot_minutes: Some(30),
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_unknown_weekday_rejected() {
        let mut r = valid_request();
        r.weekdays.push("lunes".to_string());
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_empty_slots_rejected() {
        let mut r = valid_request();
        r.slots.clear();
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_slots_sorted_and_deduped() {
        let mut r = valid_request();
        r.slots = vec![
            "11:00".to_string(),
            "09:00".to_string(),
            "11:00".to_string(),
        ];
        let availability = Availability::new("p1".to_string(), &r);
        assert_eq!(availability.slots, vec!["09:00", "11:00"]);
    }

    #[test]
    fn test_covers_date_checks_weekday() {
        let availability = Availability::new("p1".to_string(), &valid_request());
        // 2025-04-14 is a Monday, 2025-04-15 a Tuesday.
        assert!(availability.covers_date("2025-04-14"));
        assert!(!availability.covers_date("2025-04-15"));
        assert!(!availability.covers_date("not-a-date"));
    }
}
