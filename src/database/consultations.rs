use sqlx::Row;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::ConsultationRecord;

impl Database {
    /// Upsert by id. Everything except id and created_at is replaced on
    /// update; records are never deleted.
    pub async fn upsert_consultation(
        &self,
        record: &ConsultationRecord,
    ) -> ApiResult<ConsultationRecord> {
        let reasons = encode_json(&record.reasons, "reasons")?;
        let interventions = encode_json(&record.interventions, "interventions")?;
        let mental_health = encode_json(&record.mental_health_details, "mental_health_details")?;
        let bullying = encode_json(&record.bullying_details, "bullying_details")?;
        let addiction = encode_json(&record.addiction_details, "addiction_details")?;

        sqlx::query(
            "INSERT INTO consultations (id, nre, date, time_start, time_end, age, course, gender,
                                        reasons, mental_health_details, bullying_details,
                                        addiction_details, other_reason_detail, interventions,
                                        referral_detail, notes, professional_id, professional_name,
                                        professional_email, center_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                 nre = excluded.nre,
                 date = excluded.date,
                 time_start = excluded.time_start,
                 time_end = excluded.time_end,
                 age = excluded.age,
                 course = excluded.course,
                 gender = excluded.gender,
                 reasons = excluded.reasons,
                 mental_health_details = excluded.mental_health_details,
                 bullying_details = excluded.bullying_details,
                 addiction_details = excluded.addiction_details,
                 other_reason_detail = excluded.other_reason_detail,
                 interventions = excluded.interventions,
                 referral_detail = excluded.referral_detail,
                 notes = excluded.notes,
                 professional_id = excluded.professional_id,
                 professional_name = excluded.professional_name,
                 professional_email = excluded.professional_email,
                 center_id = excluded.center_id,
                 updated_at = excluded.updated_at",
        )
        .bind(&record.id)
        .bind(&record.nre)
        .bind(&record.date)
        .bind(&record.time_start)
        .bind(&record.time_end)
        .bind(record.age)
        .bind(&record.course)
        .bind(&record.gender)
        .bind(&reasons)
        .bind(&mental_health)
        .bind(&bullying)
        .bind(&addiction)
        .bind(&record.other_reason_detail)
        .bind(&interventions)
        .bind(&record.referral_detail)
        .bind(&record.notes)
        .bind(&record.professional_id)
        .bind(&record.professional_name)
        .bind(&record.professional_email)
        .bind(&record.center_id)
        .bind(&record.created_at)
        .bind(&record.updated_at)
        .execute(&self.pool)
        .await?;

        self.get_consultation_by_id(&record.id)
            .await?
            .ok_or_else(|| ApiError::Internal("Consultation missing after upsert".to_string()))
    }

    pub async fn get_consultation_by_id(&self, id: &str) -> ApiResult<Option<ConsultationRecord>> {
        let row = sqlx::query(
            "SELECT id, nre, date, time_start, time_end, age, course, gender, reasons,
                    mental_health_details, bullying_details, addiction_details,
                    other_reason_detail, interventions, referral_detail, notes,
                    professional_id, professional_name, professional_email, center_id,
                    created_at, updated_at
             FROM consultations
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_consultation(&row)).transpose()
    }

    pub async fn list_consultations_by_professional(
        &self,
        professional_id: &str,
    ) -> ApiResult<Vec<ConsultationRecord>> {
        let rows = sqlx::query(
            "SELECT id, nre, date, time_start, time_end, age, course, gender, reasons,
                    mental_health_details, bullying_details, addiction_details,
                    other_reason_detail, interventions, referral_detail, notes,
                    professional_id, professional_name, professional_email, center_id,
                    created_at, updated_at
             FROM consultations
             WHERE professional_id = ?
             ORDER BY date DESC, created_at DESC",
        )
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_consultation).collect()
    }
}

fn encode_json<T: serde::Serialize>(value: &T, field: &str) -> ApiResult<String> {
    serde_json::to_string(value)
        .map_err(|e| ApiError::Internal(format!("Failed to encode {}: {}", field, e)))
}

fn map_consultation(row: &sqlx::sqlite::SqliteRow) -> ApiResult<ConsultationRecord> {
    let reasons: String = row.try_get("reasons")?;
    let interventions: String = row.try_get("interventions")?;
    let mental_health: String = row.try_get("mental_health_details")?;
    let bullying: String = row.try_get("bullying_details")?;
    let addiction: String = row.try_get("addiction_details")?;

    Ok(ConsultationRecord {
        id: row.try_get("id")?,
        nre: row.try_get("nre")?,
        date: row.try_get("date")?,
        time_start: row.try_get("time_start").ok(),
        time_end: row.try_get("time_end").ok(),
        age: row.try_get("age").ok(),
        course: row.try_get("course").ok(),
        gender: row.try_get("gender").ok(),
        reasons: serde_json::from_str(&reasons).unwrap_or_default(),
        mental_health_details: serde_json::from_str(&mental_health).unwrap_or_default(),
        bullying_details: serde_json::from_str(&bullying).unwrap_or_default(),
        addiction_details: serde_json::from_str(&addiction).unwrap_or_default(),
        other_reason_detail: row.try_get("other_reason_detail").ok(),
        interventions: serde_json::from_str(&interventions).unwrap_or_default(),
        referral_detail: row.try_get("referral_detail").ok(),
        notes: row.try_get("notes").ok(),
        professional_id: row.try_get("professional_id")?,
        professional_name: row.try_get("professional_name")?,
        professional_email: row.try_get("professional_email")?,
        center_id: row.try_get("center_id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
