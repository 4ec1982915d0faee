use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::now_rfc3339;

/// Top-level consultation reasons. Closed vocabulary; the Spanish tags are
/// the stored wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsultationReason {
    General,
    SaludMental,
    Acoso,
    Adicciones,
    Alimentacion,
    Sexualidad,
    Otro,
}

impl ConsultationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationReason::General => "general",
            ConsultationReason::SaludMental => "salud_mental",
            ConsultationReason::Acoso => "acoso",
            ConsultationReason::Adicciones => "adicciones",
            ConsultationReason::Alimentacion => "alimentacion",
            ConsultationReason::Sexualidad => "sexualidad",
            ConsultationReason::Otro => "otro",
        }
    }
}

/// Intervention types applied during a consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
    Escucha,
    Orientacion,
    Seguimiento,
    Derivacion,
    ComunicacionFamilia,
}

impl InterventionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterventionType::Escucha => "escucha",
            InterventionType::Orientacion => "orientacion",
            InterventionType::Seguimiento => "seguimiento",
            InterventionType::Derivacion => "derivacion",
            InterventionType::ComunicacionFamilia => "comunicacion_familia",
        }
    }
}

/// Clinical note authored by a professional. Students are referenced only by
/// NRE; the record is never exposed to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsultationRecord {
    pub id: String,
    pub nre: String,
    pub date: String,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub age: Option<i64>,
    pub course: Option<String>,
    pub gender: Option<String>,
    pub reasons: Vec<ConsultationReason>,
    #[serde(default)]
    pub mental_health_details: Vec<String>,
    #[serde(default)]
    pub bullying_details: Vec<String>,
    #[serde(default)]
    pub addiction_details: Vec<String>,
    pub other_reason_detail: Option<String>,
    pub interventions: Vec<InterventionType>,
    pub referral_detail: Option<String>,
    pub notes: Option<String>,
    pub professional_id: String,
    pub professional_name: String,
    pub professional_email: String,
    pub center_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Save payload; `id` present means update-in-place, absent means create.
/// Authoring-professional fields are stamped by the service, not the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct SaveConsultationRequest {
    pub id: Option<String>,
    pub nre: String,
    pub date: String,
    pub time_start: Option<String>,
    pub time_end: Option<String>,
    pub age: Option<i64>,
    pub course: Option<String>,
    pub gender: Option<String>,
    pub reasons: Vec<ConsultationReason>,
    #[serde(default)]
    pub mental_health_details: Vec<String>,
    #[serde(default)]
    pub bullying_details: Vec<String>,
    #[serde(default)]
    pub addiction_details: Vec<String>,
    pub other_reason_detail: Option<String>,
    pub interventions: Vec<InterventionType>,
    pub referral_detail: Option<String>,
    pub notes: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

impl SaveConsultationRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.nre.trim().is_empty() {
            return Err("nre is required".to_string());
        }
        if self.date.trim().is_empty() {
            return Err("date is required".to_string());
        }
        if self.reasons.is_empty() {
            return Err("At least one consultation reason is required".to_string());
        }
        if self.interventions.is_empty() {
            return Err("At least one intervention is required".to_string());
        }
        if self.reasons.contains(&ConsultationReason::Otro) && is_blank(&self.other_reason_detail) {
            return Err("Reason 'otro' requires an explanation".to_string());
        }
        if self.interventions.contains(&InterventionType::Derivacion)
            && is_blank(&self.referral_detail)
        {
            return Err("Intervention 'derivacion' requires referral details".to_string());
        }
        // Sub-reason detail sets only make sense under their parent reason.
        if !self.mental_health_details.is_empty()
            && !self.reasons.contains(&ConsultationReason::SaludMental)
        {
            return Err("Mental-health details require the 'salud_mental' reason".to_string());
        }
        if !self.bullying_details.is_empty() && !self.reasons.contains(&ConsultationReason::Acoso) {
            return Err("Bullying details require the 'acoso' reason".to_string());
        }
        if !self.addiction_details.is_empty()
            && !self.reasons.contains(&ConsultationReason::Adicciones)
        {
            return Err("Addiction details require the 'adicciones' reason".to_string());
        }
        Ok(())
    }
}

impl ConsultationRecord {
    /// Build a record from a validated save request, stamping the authoring
    /// professional. A caller-supplied id is kept (upsert), otherwise a new
    /// one is minted.
    pub fn from_request(
        request: &SaveConsultationRequest,
        professional_id: String,
        professional_name: String,
        professional_email: String,
        center_id: String,
    ) -> Self {
        let now = now_rfc3339();
        Self {
            id: request
                .id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            nre: request.nre.trim().to_string(),
            date: request.date.trim().to_string(),
            time_start: request.time_start.clone(),
            time_end: request.time_end.clone(),
            age: request.age,
            course: request.course.clone(),
            gender: request.gender.clone(),
            reasons: request.reasons.clone(),
            mental_health_details: request.mental_health_details.clone(),
            bullying_details: request.bullying_details.clone(),
            addiction_details: request.addiction_details.clone(),
            other_reason_detail: request.other_reason_detail.clone(),
            interventions: request.interventions.clone(),
            referral_detail: request.referral_detail.clone(),
            notes: request.notes.clone(),
            professional_id,
            professional_name,
            professional_email,
            center_id,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> SaveConsultationRequest {
        SaveConsultationRequest {
            id: None,
            nre: "1234567".to_string(),
            date: "2025-04-15".to_string(),
            time_start: Some("10:30".to_string()),
            time_end: Some("11:00".to_string()),
            age: Some(15),
            course: Some("4 ESO".to_string()),
            gender: Some("f".to_string()),
            reasons: vec![ConsultationReason::General],
            mental_health_details: vec![],
            bullying_details: vec![],
            addiction_details: vec![],
            other_reason_detail: None,
            interventions: vec![InterventionType::Escucha],
            referral_detail: None,
            notes: None,
        }
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_requires_reason_and_intervention() {
        let mut r = valid_request();
        r.reasons.clear();
        assert!(r.validate().is_err());

        let mut r = valid_request();
        r.interventions.clear();
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_otro_requires_explanation() {
        let mut r = valid_request();
        r.reasons = vec![ConsultationReason::Otro];
        r.other_reason_detail = None;
        assert!(r.validate().is_err());

        r.other_reason_detail = Some("   ".to_string());
        assert!(r.validate().is_err());

        r.other_reason_detail = Some("consulta sobre vacunas".to_string());
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_derivacion_requires_referral_detail() {
        let mut r = valid_request();
        r.interventions = vec![InterventionType::Derivacion];
        r.referral_detail = None;
        assert!(r.validate().is_err());

        r.referral_detail = Some("derivada a salud mental CSM".to_string());
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_sub_details_require_parent_reason() {
        let mut r = valid_request();
        r.mental_health_details = vec!["ansiedad".to_string()];
        assert!(r.validate().is_err());

        r.reasons.push(ConsultationReason::SaludMental);
        assert!(r.validate().is_ok());
    }

    #[test]
    fn test_from_request_keeps_supplied_id() {
        let mut r = valid_request();
        r.id = Some("existing-id".to_string());
        let record = ConsultationRecord::from_request(
            &r,
            "p1".to_string(),
            "Nurse".to_string(),
            "nurse@murciaeduca.es".to_string(),
            "c1".to_string(),
        );
        assert_eq!(record.id, "existing-id");
        assert_eq!(record.professional_id, "p1");
    }
}
