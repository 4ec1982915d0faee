use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::api::middleware::{ApiError, ApiResult, AppState, AuthenticatedUser};
use crate::models::{SetAvailabilityRequest, UserRole};

/// Upsert the caller's availability window for one center
pub async fn set_availability(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<SetAvailabilityRequest>,
) -> ApiResult<impl IntoResponse> {
    if auth_user.user.role != UserRole::Professional {
        return Err(ApiError::Forbidden(
            "Only professionals can configure availability".to_string(),
        ));
    }

    let availability = state
        .availability_service
        .set_availability(&auth_user.user.id, &request)
        .await?;

    Ok(Json(availability))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub professional_id: String,
    pub center_id: String,
}

/// Availability for a (professional, center) pair; students read this while
/// picking a slot.
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> ApiResult<impl IntoResponse> {
    let availability = state
        .availability_service
        .get_availability(&query.professional_id, &query.center_id)
        .await?;

    Ok(Json(availability))
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub professional_id: String,
    pub center_id: String,
    pub date: String,
}

/// Bookable slots for a date: the recurring window minus taken slots
pub async fn get_bookable_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotsQuery>,
) -> ApiResult<impl IntoResponse> {
    let slots = state
        .availability_service
        .get_bookable_slots(&query.professional_id, &query.center_id, &query.date)
        .await?;

    Ok(Json(slots))
}
