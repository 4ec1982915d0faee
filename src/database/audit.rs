use sqlx::Row;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::{AuditAction, AuditEntry, AuditResource, UserRole};

impl Database {
    pub async fn insert_audit(&self, entry: &AuditEntry) -> ApiResult<()> {
        let metadata = serde_json::to_string(&entry.metadata)
            .map_err(|e| ApiError::Internal(format!("Failed to encode audit metadata: {}", e)))?;

        sqlx::query(
            "INSERT INTO audit (id, action, resource_kind, resource_id, actor_id, actor_role,
                                metadata, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(entry.action.as_str())
        .bind(entry.resource_kind.as_str())
        .bind(&entry.resource_id)
        .bind(&entry.actor_id)
        .bind(entry.actor_role.as_str())
        .bind(&metadata)
        .bind(&entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_audit_for_resource(
        &self,
        resource_kind: AuditResource,
        resource_id: &str,
    ) -> ApiResult<Vec<AuditEntry>> {
        let rows = sqlx::query(
            "SELECT id, action, resource_kind, resource_id, actor_id, actor_role, metadata,
                    created_at
             FROM audit
             WHERE resource_kind = ? AND resource_id = ?
             ORDER BY created_at ASC, id ASC",
        )
        .bind(resource_kind.as_str())
        .bind(resource_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_audit).collect()
    }
}

fn map_audit(row: &sqlx::sqlite::SqliteRow) -> ApiResult<AuditEntry> {
    let metadata: String = row.try_get("metadata")?;

    Ok(AuditEntry {
        id: row.try_get("id")?,
        action: AuditAction::from(row.try_get::<String, _>("action")?),
        resource_kind: AuditResource::from(row.try_get::<String, _>("resource_kind")?),
        resource_id: row.try_get("resource_id")?,
        actor_id: row.try_get("actor_id")?,
        actor_role: UserRole::from(row.try_get::<String, _>("actor_role")?),
        metadata: serde_json::from_str(&metadata).unwrap_or(serde_json::Value::Null),
        created_at: row.try_get("created_at")?,
    })
}
