use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use crate::api::middleware::error::ApiResult;
use crate::models::*;

pub mod appointments;
pub mod audit;
pub mod availability;
pub mod chats;
pub mod consultations;
pub mod messages;
pub mod sessions;

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(20)
            .min_connections(1)
            .connect(database_url)
            .await?;

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // User operations

    pub async fn create_user(&self, user: &User) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO users (id, email, role, display_name, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.display_name)
        .bind(&user.password_hash)
        .bind(&user.created_at)
        .bind(&user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn create_student(&self, student: &Student) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO students (id, user_id, nre, course, gender, birth_year)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&student.id)
        .bind(&student.user_id)
        .bind(&student.nre)
        .bind(&student.course)
        .bind(&student.gender)
        .bind(student.birth_year)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn create_professional(&self, professional: &Professional) -> ApiResult<()> {
        sqlx::query(
            "INSERT INTO professionals (id, user_id, center_id, specialty)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&professional.id)
        .bind(&professional.user_id)
        .bind(&professional.center_id)
        .bind(professional.specialty.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_user_by_id(&self, id: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, role, display_name, password_hash, created_at, updated_at
             FROM users
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_user(&row)).transpose()
    }

    pub async fn get_user_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, role, display_name, password_hash, created_at, updated_at
             FROM users
             WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_user(&row)).transpose()
    }

    pub async fn get_student_by_user_id(&self, user_id: &str) -> ApiResult<Option<Student>> {
        let row = sqlx::query(
            "SELECT id, user_id, nre, course, gender, birth_year
             FROM students
             WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_student(&row)).transpose()
    }

    pub async fn get_student_by_nre(&self, nre: &str) -> ApiResult<Option<Student>> {
        let row = sqlx::query(
            "SELECT id, user_id, nre, course, gender, birth_year
             FROM students
             WHERE nre = ?",
        )
        .bind(nre)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_student(&row)).transpose()
    }

    pub async fn get_professional_by_user_id(
        &self,
        user_id: &str,
    ) -> ApiResult<Option<Professional>> {
        let row = sqlx::query(
            "SELECT id, user_id, center_id, specialty
             FROM professionals
             WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| map_professional(&row)).transpose()
    }

    pub async fn update_user_password(&self, user_id: &str, password_hash: &str) -> ApiResult<()> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(crate::utils::now_rfc3339())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn map_user(row: &sqlx::sqlite::SqliteRow) -> ApiResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        role: UserRole::from(row.try_get::<String, _>("role")?),
        display_name: row.try_get("display_name")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn map_student(row: &sqlx::sqlite::SqliteRow) -> ApiResult<Student> {
    Ok(Student {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        nre: row.try_get("nre")?,
        course: row.try_get("course").ok(),
        gender: row.try_get("gender").ok(),
        birth_year: row.try_get("birth_year").ok(),
    })
}

fn map_professional(row: &sqlx::sqlite::SqliteRow) -> ApiResult<Professional> {
    Ok(Professional {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        center_id: row.try_get("center_id")?,
        specialty: Specialty::from(row.try_get::<String, _>("specialty")?),
    })
}
