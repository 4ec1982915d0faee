use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::now_rfc3339;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Student,
    Professional,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => "student",
            UserRole::Professional => "professional",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<String> for UserRole {
    fn from(s: String) -> Self {
        match s.as_str() {
            "professional" => UserRole::Professional,
            _ => UserRole::Student,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    Nurse,
    SocialWorker,
    Specialist,
}

impl Specialty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Nurse => "nurse",
            Specialty::SocialWorker => "social_worker",
            Specialty::Specialist => "specialist",
        }
    }
}

impl From<String> for Specialty {
    fn from(s: String) -> Self {
        match s.as_str() {
            "social_worker" => Specialty::SocialWorker,
            "specialist" => Specialty::Specialist,
            _ => Specialty::Nurse,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub role: UserRole,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub user_id: String,
    pub nre: String,
    pub course: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: String,
    pub user_id: String,
    pub center_id: String,
    pub specialty: Specialty,
}

impl User {
    pub fn new(email: String, role: UserRole, display_name: String, password_hash: String) -> Self {
        let now = now_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_lowercase(),
            role,
            display_name,
            password_hash,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl Student {
    pub fn new(
        user_id: String,
        nre: String,
        course: Option<String>,
        gender: Option<String>,
        birth_year: Option<i64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            nre,
            course,
            gender,
            birth_year,
        }
    }
}

impl Professional {
    pub fn new(user_id: String, center_id: String, specialty: Specialty) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            center_id,
            specialty,
        }
    }
}

// DTOs for the auth API

#[derive(Debug, Deserialize)]
pub struct RegisterStudentRequest {
    pub nre: String,
    pub password: String,
    pub display_name: String,
    pub course: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RegisterProfessionalRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub center_id: String,
    pub specialty: Specialty,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordResetComplete {
    pub token: String,
    pub new_password: String,
}

/// Profile payload returned by `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional: Option<Professional>,
}
