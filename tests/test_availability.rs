use consultorio::models::{SetAvailabilityRequest, UserRole};
use sqlx::Row;

mod helpers;
use helpers::*;

fn window(center_id: &str, slots: &[&str]) -> SetAvailabilityRequest {
    SetAvailabilityRequest {
        center_id: center_id.to_string(),
        // 2025-04-15 is a Tuesday
        weekdays: vec!["tue".to_string(), "thu".to_string()],
        slots: slots.iter().map(|s| s.to_string()).collect(),
        slot_minutes: Some(30),
    }
}

#[tokio::test]
async fn test_upsert_keeps_one_row_per_pair() {
    let db = setup_test_db().await;
    let service = availability_service(&db);

    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;

    let first = service
        .set_availability(&professional.id, &window("center-001", &["09:00", "09:30"]))
        .await
        .unwrap();

    let second = service
        .set_availability(&professional.id, &window("center-001", &["10:00"]))
        .await
        .unwrap();

    // Second write wins; id and created_at survive
    assert_eq!(second.slots, vec!["10:00"]);
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);

    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM availability")
        .fetch_one(db.pool())
        .await
        .unwrap()
        .try_get("n")
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_separate_centers_keep_separate_windows() {
    let db = setup_test_db().await;
    let service = availability_service(&db);

    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;

    service
        .set_availability(&professional.id, &window("center-001", &["09:00"]))
        .await
        .unwrap();
    service
        .set_availability(&professional.id, &window("center-002", &["16:00"]))
        .await
        .unwrap();

    let first = service
        .get_availability(&professional.id, "center-001")
        .await
        .unwrap()
        .unwrap();
    let second = service
        .get_availability(&professional.id, "center-002")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.slots, vec!["09:00"]);
    assert_eq!(second.slots, vec!["16:00"]);
}

#[tokio::test]
async fn test_get_missing_availability_is_none() {
    let db = setup_test_db().await;
    let service = availability_service(&db);

    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;

    let availability = service
        .get_availability(&professional.id, "center-009")
        .await
        .unwrap();
    assert!(availability.is_none());
}

#[tokio::test]
async fn test_invalid_window_rejected() {
    let db = setup_test_db().await;
    let service = availability_service(&db);

    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;

    let mut request = window("center-001", &["09:00"]);
    request.weekdays = vec!["lunes".to_string()];
    assert!(service
        .set_availability(&professional.id, &request)
        .await
        .is_err());

    let mut request = window("center-001", &["9am"]);
    request.weekdays = vec!["mon".to_string()];
    assert!(service
        .set_availability(&professional.id, &request)
        .await
        .is_err());
}

#[tokio::test]
async fn test_bookable_slots_subtract_taken_ones() {
    let db = setup_test_db().await;
    let availability = availability_service(&db);
    let appointments = appointment_service(&db);

    let student = create_test_student(&db, "1234567", "Ana").await;
    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;

    availability
        .set_availability(
            &professional.id,
            &window("center-001", &["09:00", "09:30", "10:00"]),
        )
        .await
        .unwrap();

    // 2025-04-15 is a Tuesday, inside the window
    appointments
        .create_appointment(
            &booking_request(&student.id, &professional.id, "2025-04-15", "09:30"),
            &student.id,
            UserRole::Student,
        )
        .await
        .unwrap();

    let slots = availability
        .get_bookable_slots(&professional.id, "center-001", "2025-04-15")
        .await
        .unwrap();
    assert_eq!(slots, vec!["09:00", "10:00"]);

    // A day outside the recurring pattern offers nothing (2025-04-16 is a
    // Wednesday)
    let slots = availability
        .get_bookable_slots(&professional.id, "center-001", "2025-04-16")
        .await
        .unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn test_cancelled_booking_frees_its_slot() {
    let db = setup_test_db().await;
    let availability = availability_service(&db);
    let appointments = appointment_service(&db);

    let student = create_test_student(&db, "1234567", "Ana").await;
    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;

    availability
        .set_availability(&professional.id, &window("center-001", &["09:00"]))
        .await
        .unwrap();

    let appointment = appointments
        .create_appointment(
            &booking_request(&student.id, &professional.id, "2025-04-15", "09:00"),
            &student.id,
            UserRole::Student,
        )
        .await
        .unwrap();

    assert!(availability
        .get_bookable_slots(&professional.id, "center-001", "2025-04-15")
        .await
        .unwrap()
        .is_empty());

    appointments
        .cancel_appointment(&appointment.id, &professional.id, UserRole::Professional, None)
        .await
        .unwrap();

    assert_eq!(
        availability
            .get_bookable_slots(&professional.id, "center-001", "2025-04-15")
            .await
            .unwrap(),
        vec!["09:00"]
    );
}
