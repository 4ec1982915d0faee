use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::api::middleware::{ApiResult, AppState, AuthenticatedUser};
use crate::models::SaveConsultationRequest;

/// Upsert a consultation record (professional only)
pub async fn save_record(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<SaveConsultationRequest>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .consultation_service
        .save_record(&request, &auth_user.user)
        .await?;

    Ok(Json(record))
}

/// Fetch one consultation record
pub async fn get_record(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let record = state
        .consultation_service
        .get_record(&id, &auth_user.user)
        .await?;

    Ok(Json(record))
}

/// The caller's own consultation records, newest first
pub async fn list_records(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<impl IntoResponse> {
    let records = state
        .consultation_service
        .list_for_professional(&auth_user.user)
        .await?;

    Ok(Json(records))
}
