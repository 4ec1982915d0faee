use sqlx::Row;

use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::{Message, MessageStatus, UserRole};

impl Database {
    /// Append a message and fold its side effects into the parent chat in one
    /// transaction: preview text, activity timestamp, and the counterpart's
    /// unread counter move together or not at all.
    pub async fn append_message(&self, message: &Message) -> ApiResult<()> {
        let unread_column = match message.sender_role {
            UserRole::Student => "unread_professional",
            UserRole::Professional => "unread_student",
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO messages (id, chat_id, sender_id, sender_role, body, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&message.id)
        .bind(&message.chat_id)
        .bind(&message.sender_id)
        .bind(message.sender_role.as_str())
        .bind(&message.body)
        .bind(message.status.as_str())
        .bind(&message.created_at)
        .execute(&mut *tx)
        .await?;

        // MAX() keeps updated_at monotonic even if this write races an older
        // in-flight timestamp.
        let updated = sqlx::query(&format!(
            "UPDATE chats
             SET last_message = ?,
                 updated_at = MAX(updated_at, ?),
                 {} = {} + 1
             WHERE id = ?",
            unread_column, unread_column
        ))
        .bind(&message.body)
        .bind(&message.created_at)
        .bind(&message.chat_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!(
                "Chat {} not found",
                message.chat_id
            )));
        }

        tx.commit().await?;

        Ok(())
    }

    /// Full message history, send order ascending.
    pub async fn list_messages(&self, chat_id: &str) -> ApiResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT id, chat_id, sender_id, sender_role, body, status, created_at
             FROM messages
             WHERE chat_id = ?
             ORDER BY created_at ASC, id ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_message).collect()
    }

    pub async fn get_message_by_id(&self, id: &str) -> ApiResult<Option<Message>> {
        let row = sqlx::query(
            "SELECT id, chat_id, sender_id, sender_role, body, status, created_at
             FROM messages
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_message(&row)).transpose()
    }

    pub async fn update_message_status(&self, id: &str, status: MessageStatus) -> ApiResult<()> {
        let result = sqlx::query("UPDATE messages SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Message {} not found", id)));
        }

        Ok(())
    }
}

fn map_message(row: &sqlx::sqlite::SqliteRow) -> ApiResult<Message> {
    Ok(Message {
        id: row.try_get("id")?,
        chat_id: row.try_get("chat_id")?,
        sender_id: row.try_get("sender_id")?,
        sender_role: UserRole::from(row.try_get::<String, _>("sender_role")?),
        body: row.try_get("body")?,
        status: MessageStatus::from(row.try_get::<String, _>("status")?),
        created_at: row.try_get("created_at")?,
    })
}
