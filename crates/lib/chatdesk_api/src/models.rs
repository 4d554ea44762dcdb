//! Request and response shapes for the JSON API and HTML forms.

use chatdesk_core::models::chat::{DEFAULT_MODEL, Message, Role};
use serde::{Deserialize, Serialize};

/// Error body returned by every failing JSON endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Body of `POST /api/send/`.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<i64>,
    #[serde(default = "default_model")]
    pub model: String,
}

/// Response of `POST /api/send/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub conversation_id: i64,
    pub conversation_title: String,
    pub reply: String,
    pub message_id: i64,
}

/// Response of `POST /api/conversations/new/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewConversationResponse {
    pub id: i64,
    pub title: String,
}

/// Body of `PATCH /api/conversations/{id}/rename/`.
#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    #[serde(default)]
    pub title: String,
}

/// Response of `PATCH /api/conversations/{id}/rename/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RenameResponse {
    pub title: String,
}

/// Response of `DELETE /api/conversations/{id}/delete/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// One entry of a message listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageItem {
    pub role: Role,
    pub content: String,
    pub id: i64,
}

impl From<Message> for MessageItem {
    fn from(m: Message) -> Self {
        Self {
            role: m.role,
            content: m.content,
            id: m.id,
        }
    }
}

/// Response of `GET /api/conversations/{id}/messages/`.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessagesResponse {
    pub messages: Vec<MessageItem>,
    pub title: String,
}

/// Registration form fields.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Login form fields.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// `?next=` query on the login page.
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}
