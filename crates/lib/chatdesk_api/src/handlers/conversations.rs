//! Conversation JSON endpoints.
//!
//! Every handler resolves the conversation through
//! `chatdesk_core::conversations::get_owned_conversation`, so another user's
//! conversation answers 404 exactly like a missing one.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use chatdesk_core::conversations;
use chatdesk_core::models::chat::{DEFAULT_MODEL, DEFAULT_TITLE};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    MessageItem, MessagesResponse, NewConversationResponse, RenameRequest, RenameResponse,
    SuccessResponse,
};

/// Conversation id from the path; anything that is not an integer is a missing
/// conversation.
fn conversation_id(path: Result<Path<i64>, PathRejection>) -> AppResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|_| AppError::NotFound("Conversation not found".into()))
}

/// `POST /api/conversations/new/` — create an empty conversation.
pub async fn new_conversation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<NewConversationResponse>> {
    let conversation =
        conversations::create_conversation(&state.pool, user.id, DEFAULT_TITLE, DEFAULT_MODEL)
            .await?;
    Ok(Json(NewConversationResponse {
        id: conversation.id,
        title: conversation.title,
    }))
}

/// `DELETE /api/conversations/{id}/delete/` — delete a conversation and its messages.
pub async fn delete_conversation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<SuccessResponse>> {
    let conversation =
        conversations::get_owned_conversation(&state.pool, conversation_id(path)?, user.id).await?;
    conversations::delete_conversation(&state.pool, user.id, conversation.id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// `PATCH /api/conversations/{id}/rename/` — rename; blank titles are ignored.
pub async fn rename_conversation_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    path: Result<Path<i64>, PathRejection>,
    Json(body): Json<RenameRequest>,
) -> AppResult<Json<RenameResponse>> {
    let conversation =
        conversations::get_owned_conversation(&state.pool, conversation_id(path)?, user.id).await?;
    let conversation =
        conversations::rename_conversation(&state.pool, conversation, &body.title).await?;
    Ok(Json(RenameResponse {
        title: conversation.title,
    }))
}

/// `GET /api/conversations/{id}/messages/` — all messages, oldest first.
pub async fn list_messages_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<MessagesResponse>> {
    let conversation =
        conversations::get_owned_conversation(&state.pool, conversation_id(path)?, user.id).await?;
    let messages = conversations::list_messages(&state.pool, conversation.id)
        .await?
        .into_iter()
        .map(MessageItem::from)
        .collect();
    Ok(Json(MessagesResponse {
        messages,
        title: conversation.title,
    }))
}
