use serde_json::json;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::{
    AuditAction, AuditEntry, AuditResource, ConsultationRecord, SaveConsultationRequest, User,
    UserRole,
};
use crate::services::audit_service;

#[derive(Clone)]
pub struct ConsultationService {
    db: Database,
}

impl ConsultationService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Upsert a clinical note. Conditional-requirement invariants are
    /// enforced here before any write. The authoring professional's
    /// identity and center are stamped from the acting user, never taken
    /// from the payload.
    pub async fn save_record(
        &self,
        request: &SaveConsultationRequest,
        actor: &User,
    ) -> ApiResult<ConsultationRecord> {
        if actor.role != UserRole::Professional {
            return Err(ApiError::Forbidden(
                "Only professionals may write consultation records".to_string(),
            ));
        }

        request.validate().map_err(ApiError::BadRequest)?;

        let profile = self
            .db
            .get_professional_by_user_id(&actor.id)
            .await?
            .ok_or_else(|| {
                ApiError::Internal(format!("Professional profile missing for user {}", actor.id))
            })?;

        // Distinguish create from update for the audit trail. A supplied id
        // that matches nothing is still a create (upsert semantics).
        let existing = match &request.id {
            Some(id) => self.db.get_consultation_by_id(id).await?,
            None => None,
        };

        let record = ConsultationRecord::from_request(
            request,
            actor.id.clone(),
            actor.display_name.clone(),
            actor.email.clone(),
            profile.center_id,
        );

        let stored = self.db.upsert_consultation(&record).await?;

        let action = if existing.is_some() {
            AuditAction::Update
        } else {
            AuditAction::Create
        };

        tracing::info!(
            "Consultation record saved: id={}, action={}",
            stored.id,
            action.as_str()
        );

        audit_service::record(
            &self.db,
            AuditEntry::new(
                action,
                AuditResource::Consultation,
                stored.id.clone(),
                actor.id.clone(),
                actor.role,
                json!({
                    "nre": stored.nre,
                    "date": stored.date,
                }),
            ),
        )
        .await;

        Ok(stored)
    }

    /// Records are professional-only; student tokens never reach this far,
    /// but the guard stays here rather than trusting the route table.
    pub async fn get_record(&self, id: &str, actor: &User) -> ApiResult<ConsultationRecord> {
        if actor.role != UserRole::Professional {
            return Err(ApiError::Forbidden(
                "Consultation records are not accessible to students".to_string(),
            ));
        }

        self.db
            .get_consultation_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Consultation {} not found", id)))
    }

    pub async fn list_for_professional(&self, actor: &User) -> ApiResult<Vec<ConsultationRecord>> {
        if actor.role != UserRole::Professional {
            return Err(ApiError::Forbidden(
                "Consultation records are not accessible to students".to_string(),
            ));
        }

        self.db.list_consultations_by_professional(&actor.id).await
    }
}
