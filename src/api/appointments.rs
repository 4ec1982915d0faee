use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};

use crate::api::middleware::{ApiError, ApiResult, AppState, AuthenticatedUser};
use crate::models::{
    AppointmentFilters, CancelAppointmentRequest, CreateAppointmentRequest,
    UpdateAppointmentStatusRequest, UserRole,
};

/// Book an appointment. Students book for themselves; professionals may
/// register a booking on a student's behalf.
pub async fn create_appointment(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateAppointmentRequest>,
) -> ApiResult<impl IntoResponse> {
    if auth_user.user.role == UserRole::Student && request.student_id != auth_user.user.id {
        return Err(ApiError::Forbidden(
            "Students may only book appointments for themselves".to_string(),
        ));
    }

    let appointment = state
        .appointment_service
        .create_appointment(&request, &auth_user.user.id, auth_user.user.role)
        .await?;

    Ok(Json(appointment))
}

/// The caller's own appointments: a student's bookings, or a professional's
/// agenda (with optional filters).
pub async fn my_appointments(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Query(filters): Query<AppointmentFilters>,
) -> ApiResult<impl IntoResponse> {
    let appointments = match auth_user.user.role {
        UserRole::Student => {
            state
                .appointment_service
                .get_student_appointments(&auth_user.user.id)
                .await?
        }
        UserRole::Professional => {
            state
                .appointment_service
                .get_professional_appointments(&auth_user.user.id, &filters)
                .await?
        }
    };

    Ok(Json(appointments))
}

/// A professional's appointment agenda, filterable by date, center, status.
pub async fn professional_appointments(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(professional_id): Path<String>,
    Query(filters): Query<AppointmentFilters>,
) -> ApiResult<impl IntoResponse> {
    // The agenda is private to its owner.
    if auth_user.user.id != professional_id {
        return Err(ApiError::Forbidden(
            "Appointments are only visible to their professional".to_string(),
        ));
    }

    let appointments = state
        .appointment_service
        .get_professional_appointments(&professional_id, &filters)
        .await?;

    Ok(Json(appointments))
}

/// Move an appointment through its status machine
pub async fn update_status(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateAppointmentStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    let appointment = state
        .appointment_service
        .update_appointment_status(&id, request.status, &auth_user.user.id, auth_user.user.role)
        .await?;

    Ok(Json(appointment))
}

/// Cancel an appointment, recording who and why
pub async fn cancel(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    Json(request): Json<CancelAppointmentRequest>,
) -> ApiResult<impl IntoResponse> {
    let appointment = state
        .appointment_service
        .cancel_appointment(
            &id,
            &auth_user.user.id,
            auth_user.user.role,
            request.reason.as_deref(),
        )
        .await?;

    Ok(Json(appointment))
}
