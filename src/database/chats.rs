use sqlx::Row;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::{Chat, UserRole};

impl Database {
    /// Insert the chat unless the pair already has one, then return whichever
    /// row now holds the pair's deterministic id. Safe under concurrent
    /// callers: the second insert is a no-op.
    pub async fn create_chat_if_absent(&self, chat: &Chat) -> ApiResult<Chat> {
        sqlx::query(
            "INSERT INTO chats (id, student_id, professional_id, student_name, professional_name,
                                last_message, unread_student, unread_professional, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(&chat.id)
        .bind(&chat.student_id)
        .bind(&chat.professional_id)
        .bind(&chat.student_name)
        .bind(&chat.professional_name)
        .bind(&chat.last_message)
        .bind(chat.unread_student)
        .bind(chat.unread_professional)
        .bind(&chat.created_at)
        .bind(&chat.updated_at)
        .execute(&self.pool)
        .await?;

        self.get_chat_by_id(&chat.id)
            .await?
            .ok_or_else(|| ApiError::Internal("Chat missing after insert".to_string()))
    }

    pub async fn get_chat_by_id(&self, id: &str) -> ApiResult<Option<Chat>> {
        let row = sqlx::query(
            "SELECT id, student_id, professional_id, student_name, professional_name,
                    last_message, unread_student, unread_professional, created_at, updated_at
             FROM chats
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_chat(&row)).transpose()
    }

    /// Chats where the user participates, most recently active first.
    pub async fn list_chats_for_user(&self, user_id: &str, role: UserRole) -> ApiResult<Vec<Chat>> {
        let column = match role {
            UserRole::Student => "student_id",
            UserRole::Professional => "professional_id",
        };

        let rows = sqlx::query(&format!(
            "SELECT id, student_id, professional_id, student_name, professional_name,
                    last_message, unread_student, unread_professional, created_at, updated_at
             FROM chats
             WHERE {} = ?
             ORDER BY updated_at DESC",
            column
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_chat).collect()
    }

    /// Zero the reader's unread counter. Idempotent.
    pub async fn reset_unread(&self, chat_id: &str, reader_role: UserRole) -> ApiResult<()> {
        let column = match reader_role {
            UserRole::Student => "unread_student",
            UserRole::Professional => "unread_professional",
        };

        let result = sqlx::query(&format!("UPDATE chats SET {} = 0 WHERE id = ?", column))
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Chat {} not found", chat_id)));
        }

        Ok(())
    }
}

pub(crate) fn map_chat(row: &sqlx::sqlite::SqliteRow) -> ApiResult<Chat> {
    Ok(Chat {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        professional_id: row.try_get("professional_id")?,
        student_name: row.try_get("student_name")?,
        professional_name: row.try_get("professional_name")?,
        last_message: row.try_get("last_message")?,
        unread_student: row.try_get("unread_student")?,
        unread_professional: row.try_get("unread_professional")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
