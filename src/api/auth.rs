use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;

use crate::api::middleware::{ApiResult, AppState, AuthenticatedUser};
use crate::models::{
    LoginRequest, LoginResponse, PasswordResetComplete, PasswordResetRequest,
    RegisterProfessionalRequest, RegisterStudentRequest, UserProfile, UserRole,
};
use crate::services::{auth, password_reset_service};

/// Register a student account
pub async fn register_student(
    State(state): State<AppState>,
    Json(request): Json<RegisterStudentRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::register_student(&state.db, &state.config, request).await?;
    Ok(Json(user))
}

/// Register a professional account
pub async fn register_professional(
    State(state): State<AppState>,
    Json(request): Json<RegisterProfessionalRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::register_professional(&state.db, &state.config, request).await?;
    Ok(Json(user))
}

/// Login with email and password, returning a bearer token
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = auth::authenticate(&state.db, &request.email, &request.password).await?;
    let token = state.session_service.create_session(&user.id).await?;

    tracing::info!("User logged in: {}", user.id);

    Ok(Json(LoginResponse { token, user }))
}

/// Delete the caller's session
pub async fn logout(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<impl IntoResponse> {
    state.session_service.delete_session(&auth_user.token).await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Current user plus their role profile
pub async fn me(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<impl IntoResponse> {
    let (student, professional) = match auth_user.user.role {
        UserRole::Student => (
            state.db.get_student_by_user_id(&auth_user.user.id).await?,
            None,
        ),
        UserRole::Professional => (
            None,
            state
                .db
                .get_professional_by_user_id(&auth_user.user.id)
                .await?,
        ),
    };

    Ok(Json(UserProfile {
        user: auth_user.user,
        student,
        professional,
    }))
}

/// Start a password reset; always responds success
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> ApiResult<impl IntoResponse> {
    password_reset_service::request_password_reset(&state.db, &state.config, &request.email)
        .await?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Complete a password reset with a token
pub async fn complete_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetComplete>,
) -> ApiResult<impl IntoResponse> {
    password_reset_service::complete_password_reset(&state.db, &request.token, &request.new_password)
        .await?;
    Ok(Json(json!({ "status": "ok" })))
}
