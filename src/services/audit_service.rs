use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::{AuditEntry, AuditResource};

/// Best-effort append. Audit failure must never roll back or mask the
/// mutation it documents, so errors are logged and swallowed here.
pub async fn record(db: &Database, entry: AuditEntry) {
    if let Err(e) = db.insert_audit(&entry).await {
        tracing::error!(
            "Failed to write audit entry for {} {}: {}",
            entry.resource_kind.as_str(),
            entry.resource_id,
            e
        );
    }
}

pub async fn list_for_resource(
    db: &Database,
    resource_kind: AuditResource,
    resource_id: &str,
) -> ApiResult<Vec<AuditEntry>> {
    db.list_audit_for_resource(resource_kind, resource_id).await
}
