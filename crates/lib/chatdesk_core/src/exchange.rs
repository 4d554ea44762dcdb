//! One chat exchange: store the user's message, ask the model, store the reply.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::completion::CompletionClient;
use crate::conversations::{self, ChatError};
use crate::models::chat::{ChatTurn, Role};

/// Characters kept when deriving a title from a message.
pub const TITLE_MAX_CHARS: usize = 50;

/// A message to send.
#[derive(Debug, Clone)]
pub struct SendMessage {
    pub message: String,
    /// Existing conversation to continue; a new one is created when `None`
    /// or `Some(0)`.
    pub conversation_id: Option<i64>,
    pub model: String,
}

/// What a completed exchange produced.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub conversation_id: i64,
    pub conversation_title: String,
    pub reply: String,
    pub message_id: i64,
}

/// Title for a conversation started by `message`: its first 50 characters,
/// with `...` appended when anything was cut.
pub fn derive_title(message: &str) -> String {
    let message = message.trim();
    let mut chars = message.chars();
    let head: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Run one exchange for `user_id`.
///
/// Provider failures never fail the exchange: the error text becomes the
/// assistant's reply and is stored like any other message.
pub async fn send_message(
    pool: &SqlitePool,
    client: &dyn CompletionClient,
    user_id: i64,
    request: SendMessage,
) -> Result<SendOutcome, ChatError> {
    let content = request.message.trim();
    if content.is_empty() {
        return Err(ChatError::Validation("Empty message".into()));
    }

    let mut conversation = match request.conversation_id.filter(|&id| id != 0) {
        Some(id) => conversations::get_owned_conversation(pool, id, user_id).await?,
        None => {
            conversations::create_conversation(pool, user_id, &derive_title(content), &request.model)
                .await?
        }
    };

    conversations::insert_message(pool, conversation.id, Role::User, content, None).await?;

    // The first user message names the conversation, whether or not it was
    // created by this call.
    if conversations::count_messages(pool, conversation.id, Role::User).await? == 1 {
        conversation = conversations::set_title(pool, conversation.id, &derive_title(content)).await?;
    }

    let history: Vec<ChatTurn> = conversations::list_messages(pool, conversation.id)
        .await?
        .iter()
        .map(ChatTurn::from)
        .collect();

    debug!(
        conversation_id = conversation.id,
        model = %request.model,
        turns = history.len(),
        "requesting reply"
    );

    let (reply, tokens_used) = match client.complete(&request.model, &history).await {
        Ok(completion) => (completion.content, completion.tokens_used),
        Err(e) => {
            warn!(
                conversation_id = conversation.id,
                provider = client.provider_name(),
                error = %e,
                "completion failed"
            );
            (
                format!("Error calling {} API: {e}", client.provider_name()),
                None,
            )
        }
    };

    let assistant =
        conversations::insert_message(pool, conversation.id, Role::Assistant, &reply, tokens_used)
            .await?;
    conversations::touch_conversation(pool, conversation.id).await?;

    Ok(SendOutcome {
        conversation_id: conversation.id,
        conversation_title: conversation.title,
        reply,
        message_id: assistant.id,
    })
}
