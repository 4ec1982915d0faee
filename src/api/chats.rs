use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::api::middleware::{ApiError, ApiResult, AppState, AuthenticatedUser};
use crate::models::{
    Chat, ChatResponse, CreateChatRequest, SendMessageRequest, UpdateMessageStatusRequest,
};

fn ensure_participant(chat: &Chat, auth_user: &AuthenticatedUser) -> ApiResult<()> {
    let user_id = &auth_user.user.id;
    if &chat.student_id != user_id && &chat.professional_id != user_id {
        return Err(ApiError::Forbidden(
            "Not a participant of this chat".to_string(),
        ));
    }
    Ok(())
}

/// List the caller's chats, most recently active first
pub async fn list_chats(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
) -> ApiResult<impl IntoResponse> {
    let chats = state
        .chat_service
        .get_user_chats(&auth_user.user.id, auth_user.user.role)
        .await?;

    let chats: Vec<ChatResponse> = chats.into_iter().map(ChatResponse::from).collect();
    Ok(Json(chats))
}

/// Get-or-create the chat for a (student, professional) pair
pub async fn create_chat(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Json(request): Json<CreateChatRequest>,
) -> ApiResult<impl IntoResponse> {
    // The caller must be one side of the pair.
    let user_id = &auth_user.user.id;
    if &request.student_id != user_id && &request.professional_id != user_id {
        return Err(ApiError::Forbidden(
            "Chats can only be opened by one of their participants".to_string(),
        ));
    }

    let chat = state
        .chat_service
        .create_chat(&request.student_id, &request.professional_id)
        .await?;

    Ok(Json(ChatResponse::from(chat)))
}

/// Full message history, send order ascending
pub async fn get_messages(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(chat_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let chat = state.chat_service.get_chat(&chat_id).await?;
    ensure_participant(&chat, &auth_user)?;

    let messages = state.chat_service.get_chat_messages(&chat_id).await?;
    Ok(Json(messages))
}

/// Append a message to a chat
pub async fn send_message(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(chat_id): Path<String>,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let chat = state.chat_service.get_chat(&chat_id).await?;
    ensure_participant(&chat, &auth_user)?;

    let message = state
        .chat_service
        .send_message(
            &chat_id,
            &auth_user.user.id,
            auth_user.user.role,
            &request.body,
        )
        .await?;

    Ok(Json(message))
}

/// Advisory delivery-flag update on a single message
pub async fn update_message_status(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
    Json(request): Json<UpdateMessageStatusRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .chat_service
        .update_message_status(&message_id, request.status)
        .await?;

    Ok(Json(json!({ "status": "ok" })))
}

/// Reset the caller's unread counter on a chat
pub async fn mark_read(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(chat_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let chat = state.chat_service.get_chat(&chat_id).await?;
    ensure_participant(&chat, &auth_user)?;

    state
        .chat_service
        .mark_chat_as_read(&chat_id, auth_user.user.role)
        .await?;

    Ok(Json(json!({ "status": "ok" })))
}
