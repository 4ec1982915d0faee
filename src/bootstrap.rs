use anyhow::Context;

use crate::api::middleware::AppState;
use crate::config::Config;
use crate::database::Database;
use crate::events::EventBus;
use crate::models::{RegisterProfessionalRequest, Specialty};
use crate::services::{
    auth, AppointmentService, AvailabilityService, ChatService, ConsultationService,
    SessionService,
};

/// Seed the initial professional account from configuration so a fresh
/// deployment has someone on the staff side. No-op when unconfigured or the
/// account already exists.
pub async fn initialize_seed_professional(db: &Database, config: &Config) -> anyhow::Result<()> {
    let (email, password) = match (
        &config.seed_professional_email,
        &config.seed_professional_password,
    ) {
        (Some(email), Some(password)) => (email.clone(), password.clone()),
        _ => {
            tracing::debug!("No seed professional configured; skipping");
            return Ok(());
        }
    };

    if db
        .get_user_by_email(&email.to_lowercase())
        .await
        .map_err(|e| anyhow::anyhow!("Seed lookup failed: {}", e))?
        .is_some()
    {
        tracing::debug!("Seed professional already present");
        return Ok(());
    }

    auth::register_professional(
        db,
        config,
        RegisterProfessionalRequest {
            email,
            password,
            display_name: "Enfermería".to_string(),
            center_id: config.seed_professional_center.clone(),
            specialty: Specialty::Nurse,
        },
    )
    .await
    .map_err(|e| anyhow::anyhow!("Seed professional registration failed: {}", e))?;

    tracing::info!("Seed professional account created");

    Ok(())
}

/// Wire up services and shared state for the router.
pub async fn build_app_state(db: Database, config: &Config) -> anyhow::Result<AppState> {
    let event_bus = EventBus::default();

    let chat_service = ChatService::new(db.clone(), event_bus.clone());
    let appointment_service = AppointmentService::new(db.clone(), event_bus.clone());
    let availability_service = AvailabilityService::new(db.clone());
    let consultation_service = ConsultationService::new(db.clone());
    let session_service = SessionService::new(db.clone(), config.session_duration_hours);

    initialize_seed_professional(&db, config)
        .await
        .context("seeding professional account")?;

    Ok(AppState {
        db,
        config: config.clone(),
        event_bus,
        chat_service,
        appointment_service,
        availability_service,
        consultation_service,
        session_service,
    })
}
