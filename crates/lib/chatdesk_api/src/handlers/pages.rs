//! HTML pages — conversation list and chat view.

use axum::Extension;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use chatdesk_core::conversations::{self, ChatError};
use chatdesk_core::models::chat::DEFAULT_MODEL;
use minijinja::context;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::views::{CHAT_JS, render};

/// Models offered in the composer's model picker.
pub const AVAILABLE_MODELS: &[&str] = &["gpt-4o-mini", "gpt-4o", "gpt-4.1-mini", "gpt-4.1"];

/// Model picker entries, making sure `selected` is among them.
fn model_choices(selected: &str) -> Vec<String> {
    let mut models: Vec<String> = AVAILABLE_MODELS.iter().map(|m| m.to_string()).collect();
    if !models.iter().any(|m| m == selected) {
        models.push(selected.to_string());
    }
    models
}

/// `GET /` — conversation list with an empty chat pane.
pub async fn index(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Html<String>> {
    let conversations = conversations::list_conversations(&state.pool, user.id).await?;
    render(
        &state.views,
        "index.html",
        context! {
            username => user.username,
            conversations,
            active_conversation => (),
            messages => Vec::<()>::new(),
            models => model_choices(DEFAULT_MODEL),
            selected_model => DEFAULT_MODEL,
        },
    )
}

/// `GET /c/{id}/` — chat view for one of the caller's conversations.
pub async fn conversation_view(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Response> {
    let Ok(Path(conversation_id)) = path else {
        return not_found(&state);
    };
    let conversation =
        match conversations::get_owned_conversation(&state.pool, conversation_id, user.id).await {
            Ok(c) => c,
            Err(ChatError::NotFound) => return not_found(&state),
            Err(e) => return Err(e.into()),
        };

    let conversation_list = conversations::list_conversations(&state.pool, user.id).await?;
    let messages = conversations::list_messages(&state.pool, conversation.id).await?;
    let selected_model = conversation.model.clone();

    let page = render(
        &state.views,
        "index.html",
        context! {
            username => user.username,
            conversations => conversation_list,
            active_conversation => conversation,
            messages,
            models => model_choices(&selected_model),
            selected_model,
        },
    )?;
    Ok(page.into_response())
}

/// 404 page for conversations that are missing or not the caller's.
fn not_found(state: &AppState) -> AppResult<Response> {
    let page = render(&state.views, "not_found.html", context! {})?;
    Ok((StatusCode::NOT_FOUND, page).into_response())
}

/// `GET /static/chat.js` — browser client.
pub async fn chat_js() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        CHAT_JS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_model_is_always_offered() {
        assert_eq!(model_choices("gpt-4o").len(), AVAILABLE_MODELS.len());
        let models = model_choices("o3-mini");
        assert_eq!(models.last().map(String::as_str), Some("o3-mini"));
    }
}
