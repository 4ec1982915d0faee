use consultorio::models::UserRole;

mod helpers;
use helpers::*;

#[tokio::test]
async fn test_create_chat_is_idempotent() {
    let db = setup_test_db().await;
    let service = chat_service(&db);

    let student = create_test_student(&db, "1234567", "Ana").await;
    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;

    let first = service
        .create_chat(&student.id, &professional.id)
        .await
        .unwrap();
    let second = service
        .create_chat(&student.id, &professional.id)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);

    let chats = service
        .get_user_chats(&student.id, UserRole::Student)
        .await
        .unwrap();
    assert_eq!(chats.len(), 1);
}

#[tokio::test]
async fn test_create_chat_converges_under_concurrent_calls() {
    let db = setup_test_db().await;
    let service = chat_service(&db);

    let student = create_test_student(&db, "1234567", "Ana").await;
    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;

    let s1 = service.clone();
    let s2 = service.clone();
    let (a_id, b_id) = (student.id.clone(), professional.id.clone());
    let (c_id, d_id) = (student.id.clone(), professional.id.clone());

    let (a, b) = tokio::join!(
        tokio::spawn(async move { s1.create_chat(&a_id, &b_id).await }),
        tokio::spawn(async move { s2.create_chat(&c_id, &d_id).await }),
    );

    let a = a.unwrap().unwrap();
    let b = b.unwrap().unwrap();
    assert_eq!(a.id, b.id);

    let chats = service
        .get_user_chats(&professional.id, UserRole::Professional)
        .await
        .unwrap();
    assert_eq!(chats.len(), 1);
}

#[tokio::test]
async fn test_create_chat_rejects_unknown_users() {
    let db = setup_test_db().await;
    let service = chat_service(&db);

    let student = create_test_student(&db, "1234567", "Ana").await;

    let result = service.create_chat(&student.id, "missing-user").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_create_chat_rejects_role_mismatch() {
    let db = setup_test_db().await;
    let service = chat_service(&db);

    let student_a = create_test_student(&db, "1234567", "Ana").await;
    let student_b = create_test_student(&db, "7654321", "Luis").await;

    // Two students cannot share a thread
    let result = service.create_chat(&student_a.id, &student_b.id).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_chat_denormalizes_names_at_creation() {
    let db = setup_test_db().await;
    let service = chat_service(&db);

    let student = create_test_student(&db, "1234567", "Ana").await;
    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;

    let chat = service
        .create_chat(&student.id, &professional.id)
        .await
        .unwrap();

    assert_eq!(chat.student_name, "Ana");
    assert_eq!(chat.professional_name, "Enfermera");
    assert_eq!(chat.last_message, "");
    assert_eq!(chat.unread_student, 0);
    assert_eq!(chat.unread_professional, 0);
}

#[tokio::test]
async fn test_unread_counter_counts_unseen_messages() {
    let db = setup_test_db().await;
    let service = chat_service(&db);

    let student = create_test_student(&db, "1234567", "Ana").await;
    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;
    let chat = service
        .create_chat(&student.id, &professional.id)
        .await
        .unwrap();

    for i in 0..3 {
        service
            .send_message(
                &chat.id,
                &student.id,
                UserRole::Student,
                &format!("mensaje {}", i),
            )
            .await
            .unwrap();
    }

    let chat = service.get_chat(&chat.id).await.unwrap();
    assert_eq!(chat.unread_professional, 3);
    // The sender's own counter is untouched
    assert_eq!(chat.unread_student, 0);
    assert_eq!(chat.last_message, "mensaje 2");
}

#[tokio::test]
async fn test_mark_as_read_resets_and_is_idempotent() {
    let db = setup_test_db().await;
    let service = chat_service(&db);

    let student = create_test_student(&db, "1234567", "Ana").await;
    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;
    let chat = service
        .create_chat(&student.id, &professional.id)
        .await
        .unwrap();

    for _ in 0..5 {
        service
            .send_message(&chat.id, &student.id, UserRole::Student, "hola")
            .await
            .unwrap();
    }

    service
        .mark_chat_as_read(&chat.id, UserRole::Professional)
        .await
        .unwrap();
    let after_first = service.get_chat(&chat.id).await.unwrap();
    assert_eq!(after_first.unread_professional, 0);

    // Second read-receipt is a no-op, not an error
    service
        .mark_chat_as_read(&chat.id, UserRole::Professional)
        .await
        .unwrap();
    let after_second = service.get_chat(&chat.id).await.unwrap();
    assert_eq!(after_second.unread_professional, 0);
}

#[tokio::test]
async fn test_counters_accumulate_in_both_directions() {
    let db = setup_test_db().await;
    let service = chat_service(&db);

    let student = create_test_student(&db, "1234567", "Ana").await;
    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;
    let chat = service
        .create_chat(&student.id, &professional.id)
        .await
        .unwrap();

    service
        .send_message(&chat.id, &student.id, UserRole::Student, "hola")
        .await
        .unwrap();
    service
        .send_message(
            &chat.id,
            &professional.id,
            UserRole::Professional,
            "buenos días",
        )
        .await
        .unwrap();
    service
        .send_message(
            &chat.id,
            &professional.id,
            UserRole::Professional,
            "¿cómo estás?",
        )
        .await
        .unwrap();

    let chat = service.get_chat(&chat.id).await.unwrap();
    assert_eq!(chat.unread_professional, 1);
    assert_eq!(chat.unread_student, 2);
    assert_eq!(chat.last_message, "¿cómo estás?");
}

#[tokio::test]
async fn test_chat_list_orders_by_recent_activity() {
    let db = setup_test_db().await;
    let service = chat_service(&db);

    let student = create_test_student(&db, "1234567", "Ana").await;
    let nurse = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;
    let social = create_test_professional(&db, "social@murciaeduca.es", "Trabajador Social").await;

    let chat_nurse = service.create_chat(&student.id, &nurse.id).await.unwrap();
    let chat_social = service.create_chat(&student.id, &social.id).await.unwrap();

    // Activity in the nurse chat makes it most recent
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    service
        .send_message(&chat_nurse.id, &student.id, UserRole::Student, "hola")
        .await
        .unwrap();

    let chats = service
        .get_user_chats(&student.id, UserRole::Student)
        .await
        .unwrap();
    assert_eq!(chats.len(), 2);
    assert_eq!(chats[0].id, chat_nurse.id);
    assert_eq!(chats[1].id, chat_social.id);
}

#[tokio::test]
async fn test_updated_at_never_goes_backwards() {
    let db = setup_test_db().await;
    let service = chat_service(&db);

    let student = create_test_student(&db, "1234567", "Ana").await;
    let professional = create_test_professional(&db, "nurse@murciaeduca.es", "Enfermera").await;
    let chat = service
        .create_chat(&student.id, &professional.id)
        .await
        .unwrap();

    let mut previous = chat.updated_at.clone();
    for i in 0..4 {
        service
            .send_message(
                &chat.id,
                &student.id,
                UserRole::Student,
                &format!("m{}", i),
            )
            .await
            .unwrap();
        let current = service.get_chat(&chat.id).await.unwrap().updated_at;
        assert!(current >= previous, "updated_at regressed");
        previous = current;
    }
}
