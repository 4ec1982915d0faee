use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::utils::now_rfc3339;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for AppointmentStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "confirmed" => AppointmentStatus::Confirmed,
            "cancelled" => AppointmentStatus::Cancelled,
            "completed" => AppointmentStatus::Completed,
            _ => AppointmentStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    InPerson,
    Virtual,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::InPerson => "in_person",
            Modality::Virtual => "virtual",
        }
    }
}

impl From<String> for Modality {
    fn from(s: String) -> Self {
        match s.as_str() {
            "virtual" => Modality::Virtual,
            _ => Modality::InPerson,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub student_id: String,
    pub professional_id: String,
    pub center_id: String,
    pub date: String,
    pub slot_start: String,
    pub slot_end: Option<String>,
    pub modality: Modality,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub cancelled_by: Option<String>,
    pub cancelled_role: Option<UserRole>,
    pub cancellation_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub student_id: String,
    pub professional_id: String,
    pub center_id: String,
    pub date: String,
    pub slot_start: String,
    pub slot_end: Option<String>,
    pub modality: Option<Modality>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    /// Required-field check; runs before any write so a rejected booking
    /// leaves no partial state.
    pub fn validate(&self) -> Result<(), String> {
        if self.student_id.trim().is_empty() {
            return Err("student_id is required".to_string());
        }
        if self.professional_id.trim().is_empty() {
            return Err("professional_id is required".to_string());
        }
        if self.center_id.trim().is_empty() {
            return Err("center_id is required".to_string());
        }
        if self.date.trim().is_empty() {
            return Err("date is required".to_string());
        }
        if chrono::NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").is_err() {
            return Err("date must be formatted YYYY-MM-DD".to_string());
        }
        if self.slot_start.trim().is_empty() {
            return Err("slot_start is required".to_string());
        }
        if !is_slot_format(self.slot_start.trim()) {
            return Err("slot_start must be formatted HH:MM".to_string());
        }
        if let Some(end) = &self.slot_end {
            if !is_slot_format(end.trim()) {
                return Err("slot_end must be formatted HH:MM".to_string());
            }
        }
        Ok(())
    }
}

pub fn is_slot_format(slot: &str) -> bool {
    let re = regex::Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid slot pattern");
    re.is_match(slot)
}

impl Appointment {
    pub fn from_request(request: &CreateAppointmentRequest) -> Self {
        let now = now_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            student_id: request.student_id.clone(),
            professional_id: request.professional_id.clone(),
            center_id: request.center_id.clone(),
            date: request.date.trim().to_string(),
            slot_start: request.slot_start.trim().to_string(),
            slot_end: request.slot_end.as_ref().map(|s| s.trim().to_string()),
            modality: request.modality.unwrap_or(Modality::InPerson),
            reason: request.reason.clone(),
            notes: request.notes.clone(),
            status: AppointmentStatus::Pending,
            cancelled_by: None,
            cancelled_role: None,
            cancellation_reason: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Deserialize)]
pub struct CancelAppointmentRequest {
    pub reason: Option<String>,
}

/// Filters accepted by the professional's appointment listing.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AppointmentFilters {
    pub date: Option<String>,
    pub center_id: Option<String>,
    pub status: Option<AppointmentStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            student_id: "s1".to_string(),
            professional_id: "p1".to_string(),
            center_id: "c1".to_string(),
            date: "2025-04-15".to_string(),
            slot_start: "10:30".to_string(),
            slot_end: None,
            modality: None,
            reason: Some("general".to_string()),
            notes: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        let mut r = valid_request();
        r.student_id = "".to_string();
        assert!(r.validate().is_err());

        let mut r = valid_request();
        r.date = "".to_string();
        assert!(r.validate().is_err());

        let mut r = valid_request();
        r.slot_start = " ".to_string();
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_malformed_date_and_slot_rejected() {
        let mut r = valid_request();
        r.date = "15/04/2025".to_string();
        assert!(r.validate().is_err());

        let mut r = valid_request();
        r.slot_start = "25:00".to_string();
        assert!(r.validate().is_err());

        let mut r = valid_request();
        r.slot_start = "9:30".to_string();
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_from_request_defaults() {
        let appointment = Appointment::from_request(&valid_request());
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.modality, Modality::InPerson);
        assert!(appointment.cancelled_by.is_none());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ] {
            assert_eq!(
                AppointmentStatus::from(status.as_str().to_string()),
                status
            );
        }
    }
}
