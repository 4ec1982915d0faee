use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;
use crate::utils::now_rfc3339;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Cancel,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Cancel => "cancel",
        }
    }
}

impl From<String> for AuditAction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "update" => AuditAction::Update,
            "cancel" => AuditAction::Cancel,
            _ => AuditAction::Create,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditResource {
    Appointment,
    Consultation,
}

impl AuditResource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditResource::Appointment => "appointment",
            AuditResource::Consultation => "consultation",
        }
    }
}

impl From<String> for AuditResource {
    fn from(s: String) -> Self {
        match s.as_str() {
            "consultation" => AuditResource::Consultation,
            _ => AuditResource::Appointment,
        }
    }
}

/// Immutable trace of a mutating action. Written alongside the mutation it
/// documents; never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub action: AuditAction,
    pub resource_kind: AuditResource,
    pub resource_id: String,
    pub actor_id: String,
    pub actor_role: UserRole,
    pub metadata: serde_json::Value,
    pub created_at: String,
}

impl AuditEntry {
    pub fn new(
        action: AuditAction,
        resource_kind: AuditResource,
        resource_id: String,
        actor_id: String,
        actor_role: UserRole,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action,
            resource_kind,
            resource_id,
            actor_id,
            actor_role,
            metadata,
            created_at: now_rfc3339(),
        }
    }
}
