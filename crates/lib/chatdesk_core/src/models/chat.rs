//! Conversation and message domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title given to conversations created without a first message.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Model used when a request does not name one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Database and wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role string that is not one of `user`, `assistant`, `system`.
#[derive(Debug, Error)]
#[error("unknown message role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A user-owned thread of messages.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Conversation {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub model: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One turn in a conversation.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub role: Role,
    pub content: String,
    pub tokens_used: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Raw `messages` row; `role` is validated when converting to [`Message`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct MessageRow {
    pub id: i64,
    pub conversation_id: i64,
    pub role: String,
    pub content: String,
    pub tokens_used: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for Message {
    type Error = UnknownRole;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Message {
            id: row.id,
            conversation_id: row.conversation_id,
            role: row.role.parse()?,
            content: row.content,
            tokens_used: row.tokens_used,
            created_at: row.created_at,
        })
    }
}

/// A `{role, content}` pair as sent to a completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl From<&Message> for ChatTurn {
    fn from(message: &Message) -> Self {
        ChatTurn {
            role: message.role,
            content: message.content.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_its_own_representation() {
        for role in [Role::User, Role::Assistant, Role::System] {
            assert_eq!(role.as_str().parse::<Role>().expect("parse"), role);
        }
    }

    #[test]
    fn role_rejects_unknown_values() {
        let err = "tool".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown message role: tool");
    }

    #[test]
    fn chat_turn_serializes_role_lowercase() {
        let turn = ChatTurn {
            role: Role::Assistant,
            content: "hi".into(),
        };
        let json = serde_json::to_value(&turn).expect("serialize");
        assert_eq!(json, serde_json::json!({"role": "assistant", "content": "hi"}));
    }
}
