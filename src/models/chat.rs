use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::user::UserRole;
use crate::utils::now_rfc3339;

/// One-to-one conversation thread between a student and a professional.
/// Display names are denormalized at creation time and never refreshed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub student_id: String,
    pub professional_id: String,
    pub student_name: String,
    pub professional_name: String,
    pub last_message: String,
    pub unread_student: i64,
    pub unread_professional: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Chat {
    /// The chat id is a digest of the participant pair, so get-or-create
    /// cannot race into duplicate threads: both callers compute the same id
    /// and the second insert is a no-op.
    pub fn id_for(student_id: &str, professional_id: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(b"chat:");
        hasher.update(student_id.as_bytes());
        hasher.update(b":");
        hasher.update(professional_id.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn new(
        student_id: String,
        professional_id: String,
        student_name: String,
        professional_name: String,
    ) -> Self {
        let now = now_rfc3339();
        Self {
            id: Chat::id_for(&student_id, &professional_id),
            student_id,
            professional_id,
            student_name,
            professional_name,
            last_message: String::new(),
            unread_student: 0,
            unread_professional: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Unread count seen by the given participant role.
    pub fn unread_for(&self, role: UserRole) -> i64 {
        match role {
            UserRole::Student => self.unread_student,
            UserRole::Professional => self.unread_professional,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateChatRequest {
    pub student_id: String,
    pub professional_id: String,
}

#[derive(Debug, Serialize)]
pub struct UnreadCounters {
    pub student: i64,
    pub professional: i64,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: String,
    pub student_id: String,
    pub professional_id: String,
    pub student_name: String,
    pub professional_name: String,
    pub last_message: String,
    pub unread: UnreadCounters,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Chat> for ChatResponse {
    fn from(chat: Chat) -> Self {
        Self {
            id: chat.id,
            student_id: chat.student_id,
            professional_id: chat.professional_id,
            student_name: chat.student_name,
            professional_name: chat.professional_name,
            last_message: chat.last_message,
            unread: UnreadCounters {
                student: chat.unread_student,
                professional: chat.unread_professional,
            },
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_for_is_deterministic() {
        let a = Chat::id_for("student-1", "prof-1");
        let b = Chat::id_for("student-1", "prof-1");
        assert_eq!(a, b);
    }

    #[test]
    fn test_id_for_distinguishes_pairs() {
        assert_ne!(Chat::id_for("s1", "p1"), Chat::id_for("s1", "p2"));
        assert_ne!(Chat::id_for("s1", "p1"), Chat::id_for("s2", "p1"));
        // The role prefix positions matter; swapping sides must not collide.
        assert_ne!(Chat::id_for("a", "b"), Chat::id_for("b", "a"));
    }

    #[test]
    fn test_new_chat_starts_clean() {
        let chat = Chat::new(
            "s1".to_string(),
            "p1".to_string(),
            "Student".to_string(),
            "Nurse".to_string(),
        );
        assert_eq!(chat.last_message, "");
        assert_eq!(chat.unread_student, 0);
        assert_eq!(chat.unread_professional, 0);
        assert_eq!(chat.id, Chat::id_for("s1", "p1"));
    }
}
