use sqlx::Row;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::{
    Appointment, AppointmentFilters, AppointmentStatus, Modality, UserRole,
};

impl Database {
    pub async fn create_appointment(&self, appointment: &Appointment) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO appointments (id, student_id, professional_id, center_id, date,
                                       slot_start, slot_end, modality, reason, notes, status,
                                       created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&appointment.id)
        .bind(&appointment.student_id)
        .bind(&appointment.professional_id)
        .bind(&appointment.center_id)
        .bind(&appointment.date)
        .bind(&appointment.slot_start)
        .bind(&appointment.slot_end)
        .bind(appointment.modality.as_str())
        .bind(&appointment.reason)
        .bind(&appointment.notes)
        .bind(appointment.status.as_str())
        .bind(&appointment.created_at)
        .bind(&appointment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_appointment_by_id(&self, id: &str) -> ApiResult<Option<Appointment>> {
        let row = sqlx::query(
            "SELECT id, student_id, professional_id, center_id, date, slot_start, slot_end,
                    modality, reason, notes, status, cancelled_by, cancelled_role,
                    cancellation_reason, created_at, updated_at
             FROM appointments
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_appointment(&row)).transpose()
    }

    /// Student view, date then slot ascending.
    pub async fn list_student_appointments(&self, student_id: &str) -> ApiResult<Vec<Appointment>> {
        let rows = sqlx::query(
            "SELECT id, student_id, professional_id, center_id, date, slot_start, slot_end,
                    modality, reason, notes, status, cancelled_by, cancelled_role,
                    cancellation_reason, created_at, updated_at
             FROM appointments
             WHERE student_id = ?
             ORDER BY date ASC, slot_start ASC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_appointment).collect()
    }

    /// Professional view with optional date / center / status filters.
    pub async fn list_professional_appointments(
        &self,
        professional_id: &str,
        filters: &AppointmentFilters,
    ) -> ApiResult<Vec<Appointment>> {
        let mut sql = String::from(
            "SELECT id, student_id, professional_id, center_id, date, slot_start, slot_end,
                    modality, reason, notes, status, cancelled_by, cancelled_role,
                    cancellation_reason, created_at, updated_at
             FROM appointments
             WHERE professional_id = ?",
        );
        if filters.date.is_some() {
            sql.push_str(" AND date = ?");
        }
        if filters.center_id.is_some() {
            sql.push_str(" AND center_id = ?");
        }
        if filters.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        sql.push_str(" ORDER BY date ASC, slot_start ASC");

        let mut query = sqlx::query(&sql).bind(professional_id);
        if let Some(date) = &filters.date {
            query = query.bind(date);
        }
        if let Some(center_id) = &filters.center_id {
            query = query.bind(center_id);
        }
        if let Some(status) = filters.status {
            query = query.bind(status.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;

        rows.iter().map(map_appointment).collect()
    }

    /// Non-cancelled appointments already holding the (professional, date,
    /// slot) tuple. The booking guard reads this before writing.
    pub async fn count_slot_conflicts(
        &self,
        professional_id: &str,
        date: &str,
        slot_start: &str,
    ) -> ApiResult<i64> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n
             FROM appointments
             WHERE professional_id = ? AND date = ? AND slot_start = ? AND status != 'cancelled'",
        )
        .bind(professional_id)
        .bind(date)
        .bind(slot_start)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.try_get("n")?)
    }

    /// Slot starts already taken for a professional on a date (non-cancelled).
    pub async fn list_taken_slots(
        &self,
        professional_id: &str,
        date: &str,
    ) -> ApiResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT slot_start
             FROM appointments
             WHERE professional_id = ? AND date = ? AND status != 'cancelled'",
        )
        .bind(professional_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| row.try_get("slot_start").map_err(Into::into))
            .collect()
    }

    pub async fn set_appointment_status(
        &self,
        id: &str,
        status: AppointmentStatus,
        updated_at: &str,
    ) -> ApiResult<()> {
        let result = sqlx::query("UPDATE appointments SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Appointment {} not found", id)));
        }

        Ok(())
    }

    /// Cancellation also records who cancelled and why.
    pub async fn set_appointment_cancelled(
        &self,
        id: &str,
        cancelled_by: &str,
        cancelled_role: UserRole,
        reason: Option<&str>,
        updated_at: &str,
    ) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE appointments
             SET status = 'cancelled', cancelled_by = ?, cancelled_role = ?,
                 cancellation_reason = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(cancelled_by)
        .bind(cancelled_role.as_str())
        .bind(reason)
        .bind(updated_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Appointment {} not found", id)));
        }

        Ok(())
    }
}

fn map_appointment(row: &sqlx::sqlite::SqliteRow) -> ApiResult<Appointment> {
    Ok(Appointment {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        professional_id: row.try_get("professional_id")?,
        center_id: row.try_get("center_id")?,
        date: row.try_get("date")?,
        slot_start: row.try_get("slot_start")?,
        slot_end: row.try_get("slot_end").ok(),
        modality: Modality::from(row.try_get::<String, _>("modality")?),
        reason: row.try_get("reason").ok(),
        notes: row.try_get("notes").ok(),
        status: AppointmentStatus::from(row.try_get::<String, _>("status")?),
        cancelled_by: row.try_get("cancelled_by").ok(),
        cancelled_role: row
            .try_get::<Option<String>, _>("cancelled_role")
            .ok()
            .flatten()
            .map(UserRole::from),
        cancellation_reason: row.try_get("cancellation_reason").ok(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
