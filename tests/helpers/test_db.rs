use consultorio::database::Database;
use uuid::Uuid;

/// File-based SQLite with a unique name per test so tests can run in
/// parallel against isolated databases.
pub async fn setup_test_db() -> Database {
    let temp_file = std::env::temp_dir().join(format!("consultorio_test_{}.db", Uuid::new_v4()));
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.display());

    let db = Database::connect(&db_url)
        .await
        .expect("Failed to connect to test database");

    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    db
}
