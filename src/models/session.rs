use serde::{Deserialize, Serialize};

use crate::utils::now_rfc3339;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token_hash: String,
    pub user_id: String,
    pub created_at: String,
    pub expires_at: String,
}

impl Session {
    pub fn new(token_hash: String, user_id: String, duration_hours: i64) -> Self {
        let now = time::OffsetDateTime::now_utc();
        let expires = now + time::Duration::hours(duration_hours);
        Self {
            token_hash,
            user_id,
            created_at: now_rfc3339(),
            expires_at: expires
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap(),
        }
    }

    pub fn is_expired(&self) -> bool {
        match time::OffsetDateTime::parse(
            &self.expires_at,
            &time::format_description::well_known::Rfc3339,
        ) {
            Ok(expires) => expires <= time::OffsetDateTime::now_utc(),
            // Unparseable expiry is treated as expired.
            Err(_) => true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordReset {
    pub token_hash: String,
    pub user_id: String,
    pub expires_at: String,
    pub used: bool,
    pub created_at: String,
}

impl PasswordReset {
    pub fn new(token_hash: String, user_id: String, ttl_minutes: i64) -> Self {
        let now = time::OffsetDateTime::now_utc();
        let expires = now + time::Duration::minutes(ttl_minutes);
        Self {
            token_hash,
            user_id,
            expires_at: expires
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap(),
            used: false,
            created_at: now_rfc3339(),
        }
    }

    pub fn is_expired(&self) -> bool {
        match time::OffsetDateTime::parse(
            &self.expires_at,
            &time::format_description::well_known::Rfc3339,
        ) {
            Ok(expires) => expires <= time::OffsetDateTime::now_utc(),
            Err(_) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_session_not_expired() {
        let session = Session::new("hash".to_string(), "user-1".to_string(), 9);
        assert!(!session.is_expired());
    }

    #[test]
    fn test_negative_duration_expired() {
        let session = Session::new("hash".to_string(), "user-1".to_string(), -1);
        assert!(session.is_expired());
    }

    #[test]
    fn test_garbage_expiry_counts_as_expired() {
        let session = Session {
            token_hash: "hash".to_string(),
            user_id: "user-1".to_string(),
            created_at: now_rfc3339(),
            expires_at: "not-a-date".to_string(),
        };
        assert!(session.is_expired());
    }
}
