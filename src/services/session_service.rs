use crate::api::middleware::error::{ApiError, ApiResult};
use crate::database::Database;
use crate::models::{Session, User};
use crate::services::auth::{generate_token, token_digest};

#[derive(Clone)]
pub struct SessionService {
    db: Database,
    duration_hours: i64,
}

impl SessionService {
    pub fn new(db: Database, duration_hours: i64) -> Self {
        Self { db, duration_hours }
    }

    /// Mint a session and return the bearer token. Only the digest is stored.
    pub async fn create_session(&self, user_id: &str) -> ApiResult<String> {
        let token = generate_token();
        let session = Session::new(token_digest(&token), user_id.to_string(), self.duration_hours);
        self.db.insert_session(&session).await?;

        tracing::debug!("Session created for user {}", user_id);

        Ok(token)
    }

    /// Resolve a bearer token to its session, evicting it when expired.
    pub async fn get_session_by_token(&self, token: &str) -> ApiResult<Option<Session>> {
        let digest = token_digest(token);
        let session = match self.db.get_session(&digest).await? {
            Some(session) => session,
            None => return Ok(None),
        };

        if session.is_expired() {
            self.db.delete_session(&digest).await.ok();
            return Ok(None);
        }

        Ok(Some(session))
    }

    pub async fn delete_session(&self, token: &str) -> ApiResult<()> {
        self.db.delete_session(&token_digest(token)).await
    }

    /// Current-user lookup: token -> user, or Unauthorized.
    pub async fn current_user(&self, token: &str) -> ApiResult<User> {
        let session = self
            .get_session_by_token(token)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        self.db
            .get_user_by_id(&session.user_id)
            .await?
            .ok_or(ApiError::Unauthorized)
    }
}
