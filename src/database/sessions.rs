use sqlx::Row;

use crate::api::middleware::error::ApiResult;
use crate::database::Database;
use crate::models::{PasswordReset, Session};

impl Database {
    pub async fn insert_session(&self, session: &Session) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token_hash)
        .bind(&session.user_id)
        .bind(&session.created_at)
        .bind(&session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_session(&self, token_hash: &str) -> ApiResult<Option<Session>> {
        let row = sqlx::query(
            "SELECT token_hash, user_id, created_at, expires_at
             FROM sessions
             WHERE token_hash = ?",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(Session {
                token_hash: row.try_get("token_hash")?,
                user_id: row.try_get("user_id")?,
                created_at: row.try_get("created_at")?,
                expires_at: row.try_get("expires_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    pub async fn delete_session(&self, token_hash: &str) -> ApiResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn insert_password_reset(&self, reset: &PasswordReset) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO password_resets (token_hash, user_id, expires_at, used, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&reset.token_hash)
        .bind(&reset.user_id)
        .bind(&reset.expires_at)
        .bind(reset.used)
        .bind(&reset.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_password_reset(&self, token_hash: &str) -> ApiResult<Option<PasswordReset>> {
        let row = sqlx::query(
            "SELECT token_hash, user_id, expires_at, used, created_at
             FROM password_resets
             WHERE token_hash = ?",
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            Ok(Some(PasswordReset {
                token_hash: row.try_get("token_hash")?,
                user_id: row.try_get("user_id")?,
                expires_at: row.try_get("expires_at")?,
                used: row.try_get("used")?,
                created_at: row.try_get("created_at")?,
            }))
        } else {
            Ok(None)
        }
    }

    pub async fn mark_password_reset_used(&self, token_hash: &str) -> ApiResult<()> {
        sqlx::query("UPDATE password_resets SET used = 1 WHERE token_hash = ?")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
