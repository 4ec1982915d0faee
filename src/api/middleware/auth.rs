use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::middleware::error::ApiError;
use crate::config::Config;
use crate::database::Database;
use crate::events::EventBus;
use crate::models::User;
use crate::services::{
    AppointmentService, AvailabilityService, ChatService, ConsultationService, SessionService,
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub event_bus: EventBus,
    pub chat_service: ChatService,
    pub appointment_service: AppointmentService,
    pub availability_service: AvailabilityService,
    pub consultation_service: ConsultationService,
    pub session_service: SessionService,
}

/// The resolved caller, attached as a request extension by `require_auth`.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

/// Extract and validate the bearer token from the Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|value| value.strip_prefix("Bearer ")) {
        Some(token) => token.to_string(),
        None => return Err(ApiError::Unauthorized),
    };

    // Expired sessions are evicted inside the lookup.
    let session = state
        .session_service
        .get_session_by_token(&token)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let user = state
        .db
        .get_user_by_id(&session.user_id)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user, token });

    Ok(next.run(request).await)
}
