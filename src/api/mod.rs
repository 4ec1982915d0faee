use axum::{
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod appointments;
pub mod auth;
pub mod availability;
pub mod chats;
pub mod consultations;
pub mod middleware;

use middleware::{require_auth, AppState};

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/auth/register/student", post(auth::register_student))
        .route(
            "/auth/register/professional",
            post(auth::register_professional),
        )
        .route("/auth/login", post(auth::login))
        .route(
            "/auth/password-reset/request",
            post(auth::request_password_reset),
        )
        .route(
            "/auth/password-reset/complete",
            post(auth::complete_password_reset),
        );

    let protected = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/chats", get(chats::list_chats).post(chats::create_chat))
        .route(
            "/chats/:id/messages",
            get(chats::get_messages).post(chats::send_message),
        )
        .route("/chats/:id/read", post(chats::mark_read))
        .route(
            "/messages/:id/status",
            patch(chats::update_message_status),
        )
        .route(
            "/appointments",
            post(appointments::create_appointment),
        )
        .route("/appointments/mine", get(appointments::my_appointments))
        .route(
            "/professionals/:id/appointments",
            get(appointments::professional_appointments),
        )
        .route("/appointments/:id/status", patch(appointments::update_status))
        .route("/appointments/:id/cancel", post(appointments::cancel))
        .route(
            "/availability",
            put(availability::set_availability).get(availability::get_availability),
        )
        .route("/availability/slots", get(availability::get_bookable_slots))
        .route(
            "/consultations",
            put(consultations::save_record).get(consultations::list_records),
        )
        .route("/consultations/:id", get(consultations::get_record))
        .layer(from_fn_with_state(state.clone(), require_auth));

    public
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
