#![allow(dead_code)]
use consultorio::database::Database;
use consultorio::events::EventBus;
use consultorio::models::{
    CreateAppointmentRequest, Professional, Specialty, Student, User, UserRole,
};
use consultorio::services::{
    AppointmentService, AvailabilityService, ChatService, ConsultationService,
};

/// Create a student user plus profile row. Password hashing is skipped; auth
/// flows have their own tests.
pub async fn create_test_student(db: &Database, nre: &str, name: &str) -> User {
    let user = User::new(
        format!("{}@alu.murciaeduca.es", nre),
        UserRole::Student,
        name.to_string(),
        "test-password-hash".to_string(),
    );
    let student = Student::new(user.id.clone(), nre.to_string(), Some("4 ESO".to_string()), None, None);

    db.create_user(&user).await.expect("Failed to create user");
    db.create_student(&student)
        .await
        .expect("Failed to create student");

    user
}

pub async fn create_test_professional(db: &Database, email: &str, name: &str) -> User {
    create_test_professional_at(db, email, name, "center-001").await
}

pub async fn create_test_professional_at(
    db: &Database,
    email: &str,
    name: &str,
    center_id: &str,
) -> User {
    let user = User::new(
        email.to_string(),
        UserRole::Professional,
        name.to_string(),
        "test-password-hash".to_string(),
    );
    let professional = Professional::new(user.id.clone(), center_id.to_string(), Specialty::Nurse);

    db.create_user(&user).await.expect("Failed to create user");
    db.create_professional(&professional)
        .await
        .expect("Failed to create professional");

    user
}

pub fn chat_service(db: &Database) -> ChatService {
    ChatService::new(db.clone(), EventBus::default())
}

pub fn appointment_service(db: &Database) -> AppointmentService {
    AppointmentService::new(db.clone(), EventBus::default())
}

pub fn availability_service(db: &Database) -> AvailabilityService {
    AvailabilityService::new(db.clone())
}

pub fn consultation_service(db: &Database) -> ConsultationService {
    ConsultationService::new(db.clone())
}

pub fn booking_request(
    student_id: &str,
    professional_id: &str,
    date: &str,
    slot_start: &str,
) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        student_id: student_id.to_string(),
        professional_id: professional_id.to_string(),
        center_id: "center-001".to_string(),
        date: date.to_string(),
        slot_start: slot_start.to_string(),
        slot_end: None,
        modality: None,
        reason: Some("general".to_string()),
        notes: None,
    }
}
