//! Chat request handler.

use axum::extract::State;
use axum::{Extension, Json};
use chatdesk_core::exchange::{self, SendMessage};
use chatdesk_core::models::chat::DEFAULT_MODEL;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{SendMessageRequest, SendMessageResponse};

/// `POST /api/send/` — send a message and return the assistant's reply.
pub async fn send_message_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<SendMessageRequest>,
) -> AppResult<Json<SendMessageResponse>> {
    let model = match body.model.trim() {
        "" => DEFAULT_MODEL.to_string(),
        m => m.to_string(),
    };

    let outcome = exchange::send_message(
        &state.pool,
        state.completion.as_ref(),
        user.id,
        SendMessage {
            message: body.message,
            conversation_id: body.conversation_id,
            model,
        },
    )
    .await?;

    Ok(Json(SendMessageResponse {
        conversation_id: outcome.conversation_id,
        conversation_title: outcome.conversation_title,
        reply: outcome.reply,
        message_id: outcome.message_id,
    }))
}
