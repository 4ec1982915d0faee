use sqlx::Row;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::Availability;

impl Database {
    /// Upsert keyed on (professional, center): the first write creates the
    /// row, later writes replace its window in place. id and created_at of
    /// the original row survive updates.
    pub async fn upsert_availability(&self, availability: &Availability) -> ApiResult<Availability> {
        let weekdays = serde_json::to_string(&availability.weekdays)
            .map_err(|e| ApiError::Internal(format!("Failed to encode weekdays: {}", e)))?;
        let slots = serde_json::to_string(&availability.slots)
            .map_err(|e| ApiError::Internal(format!("Failed to encode slots: {}", e)))?;

        sqlx::query(
            "INSERT INTO availability (id, professional_id, center_id, weekdays, slots,
                                       slot_minutes, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(professional_id, center_id) DO UPDATE SET
                 weekdays = excluded.weekdays,
                 slots = excluded.slots,
                 slot_minutes = excluded.slot_minutes,
                 updated_at = excluded.updated_at",
        )
        .bind(&availability.id)
        .bind(&availability.professional_id)
        .bind(&availability.center_id)
        .bind(&weekdays)
        .bind(&slots)
        .bind(availability.slot_minutes)
        .bind(&availability.created_at)
        .bind(&availability.updated_at)
        .execute(&self.pool)
        .await?;

        self.get_availability(&availability.professional_id, &availability.center_id)
            .await?
            .ok_or_else(|| ApiError::Internal("Availability missing after upsert".to_string()))
    }

    pub async fn get_availability(
        &self,
        professional_id: &str,
        center_id: &str,
    ) -> ApiResult<Option<Availability>> {
        let row = sqlx::query(
            "SELECT id, professional_id, center_id, weekdays, slots, slot_minutes,
                    created_at, updated_at
             FROM availability
             WHERE professional_id = ? AND center_id = ?",
        )
        .bind(professional_id)
        .bind(center_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_availability(&row)).transpose()
    }
}

fn map_availability(row: &sqlx::sqlite::SqliteRow) -> ApiResult<Availability> {
    let weekdays: String = row.try_get("weekdays")?;
    let slots: String = row.try_get("slots")?;

    Ok(Availability {
        id: row.try_get("id")?,
        professional_id: row.try_get("professional_id")?,
        center_id: row.try_get("center_id")?,
        weekdays: serde_json::from_str(&weekdays).unwrap_or_default(),
        slots: serde_json::from_str(&slots).unwrap_or_default(),
        slot_minutes: row.try_get("slot_minutes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
