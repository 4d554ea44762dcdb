//! Conversation and message persistence.
//!
//! Every conversation query is scoped to its owner. Callers that need a
//! conversation for a request go through [`get_owned_conversation`], which
//! reports a missing id and someone else's id the same way.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::chat::{Conversation, Message, MessageRow, Role, UnknownRole};

/// Errors raised by conversation and exchange operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conversation not found")]
    NotFound,

    #[error("Corrupt message row: {0}")]
    Corrupt(#[from] UnknownRole),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

const CONVERSATION_COLUMNS: &str = "id, user_id, title, model, created_at, updated_at";

/// List a user's conversations, most recently updated first.
pub async fn list_conversations(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<Conversation>, ChatError> {
    let rows = sqlx::query_as::<_, Conversation>(&format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations \
         WHERE user_id = ? \
         ORDER BY updated_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Create a new conversation.
pub async fn create_conversation(
    pool: &SqlitePool,
    user_id: i64,
    title: &str,
    model: &str,
) -> Result<Conversation, ChatError> {
    let now = Utc::now();
    let conversation = sqlx::query_as::<_, Conversation>(&format!(
        "INSERT INTO conversations (user_id, title, model, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?) \
         RETURNING {CONVERSATION_COLUMNS}"
    ))
    .bind(user_id)
    .bind(title)
    .bind(model)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await?;

    info!(
        conversation_id = conversation.id,
        user_id, model, "created conversation"
    );
    Ok(conversation)
}

/// Fetch a conversation owned by `user_id`.
///
/// Returns [`ChatError::NotFound`] both when the id does not exist and when
/// it belongs to another user.
pub async fn get_owned_conversation(
    pool: &SqlitePool,
    conversation_id: i64,
    user_id: i64,
) -> Result<Conversation, ChatError> {
    sqlx::query_as::<_, Conversation>(&format!(
        "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = ? AND user_id = ?"
    ))
    .bind(conversation_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ChatError::NotFound)
}

/// Rename a conversation.
///
/// Blank titles are ignored and the conversation is returned unchanged;
/// otherwise the trimmed title is stored.
pub async fn rename_conversation(
    pool: &SqlitePool,
    conversation: Conversation,
    title: &str,
) -> Result<Conversation, ChatError> {
    let title = title.trim();
    if title.is_empty() {
        debug!(conversation_id = conversation.id, "ignoring blank rename");
        return Ok(conversation);
    }
    set_title(pool, conversation.id, title).await
}

/// Overwrite a conversation title and refresh `updated_at`.
pub async fn set_title(
    pool: &SqlitePool,
    conversation_id: i64,
    title: &str,
) -> Result<Conversation, ChatError> {
    sqlx::query_as::<_, Conversation>(&format!(
        "UPDATE conversations SET title = ?, updated_at = ? \
         WHERE id = ? \
         RETURNING {CONVERSATION_COLUMNS}"
    ))
    .bind(title)
    .bind(Utc::now())
    .bind(conversation_id)
    .fetch_optional(pool)
    .await?
    .ok_or(ChatError::NotFound)
}

/// Refresh `updated_at` so the conversation sorts to the top of the list.
pub async fn touch_conversation(pool: &SqlitePool, conversation_id: i64) -> Result<(), ChatError> {
    sqlx::query("UPDATE conversations SET updated_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(conversation_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete a conversation (messages cascade).
pub async fn delete_conversation(
    pool: &SqlitePool,
    user_id: i64,
    conversation_id: i64,
) -> Result<bool, ChatError> {
    let result = sqlx::query("DELETE FROM conversations WHERE id = ? AND user_id = ?")
        .bind(conversation_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        info!(conversation_id, user_id, "deleted conversation");
    }
    Ok(deleted)
}

/// Append a message to a conversation.
pub async fn insert_message(
    pool: &SqlitePool,
    conversation_id: i64,
    role: Role,
    content: &str,
    tokens_used: Option<i64>,
) -> Result<Message, ChatError> {
    let row = sqlx::query_as::<_, MessageRow>(
        "INSERT INTO messages (conversation_id, role, content, tokens_used, created_at) \
         VALUES (?, ?, ?, ?, ?) \
         RETURNING id, conversation_id, role, content, tokens_used, created_at",
    )
    .bind(conversation_id)
    .bind(role.as_str())
    .bind(content)
    .bind(tokens_used)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(Message::try_from(row)?)
}

/// All messages of a conversation in creation order.
pub async fn list_messages(
    pool: &SqlitePool,
    conversation_id: i64,
) -> Result<Vec<Message>, ChatError> {
    let rows = sqlx::query_as::<_, MessageRow>(
        "SELECT id, conversation_id, role, content, tokens_used, created_at \
         FROM messages \
         WHERE conversation_id = ? \
         ORDER BY created_at ASC, id ASC",
    )
    .bind(conversation_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| Message::try_from(row).map_err(ChatError::from))
        .collect()
}

/// Number of messages with `role` in a conversation.
pub async fn count_messages(
    pool: &SqlitePool,
    conversation_id: i64,
    role: Role,
) -> Result<i64, ChatError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM messages WHERE conversation_id = ? AND role = ?",
    )
    .bind(conversation_id)
    .bind(role.as_str())
    .fetch_one(pool)
    .await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::queries::create_user;
    use crate::db::connect_in_memory;
    use crate::migrate::migrate;
    use crate::models::chat::{DEFAULT_MODEL, DEFAULT_TITLE};

    async fn setup() -> (SqlitePool, i64, i64) {
        let pool = connect_in_memory().await.expect("connect");
        migrate(&pool).await.expect("migrate");
        let alice = create_user(&pool, "alice", "hash").await.expect("alice");
        let bob = create_user(&pool, "bob", "hash").await.expect("bob");
        (pool, alice.id, bob.id)
    }

    #[tokio::test]
    async fn create_uses_given_title_and_model() {
        let (pool, alice, _) = setup().await;
        let c = create_conversation(&pool, alice, DEFAULT_TITLE, DEFAULT_MODEL)
            .await
            .expect("create");
        assert_eq!(c.user_id, alice);
        assert_eq!(c.title, "New Chat");
        assert_eq!(c.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn owned_fetch_hides_other_users_conversations() {
        let (pool, alice, bob) = setup().await;
        let c = create_conversation(&pool, alice, "mine", DEFAULT_MODEL)
            .await
            .expect("create");

        assert!(get_owned_conversation(&pool, c.id, alice).await.is_ok());
        assert!(matches!(
            get_owned_conversation(&pool, c.id, bob).await,
            Err(ChatError::NotFound)
        ));
        assert!(matches!(
            get_owned_conversation(&pool, c.id + 100, alice).await,
            Err(ChatError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_is_scoped_and_most_recent_first() {
        let (pool, alice, bob) = setup().await;
        let first = create_conversation(&pool, alice, "first", DEFAULT_MODEL)
            .await
            .expect("first");
        let second = create_conversation(&pool, alice, "second", DEFAULT_MODEL)
            .await
            .expect("second");
        create_conversation(&pool, bob, "bob's", DEFAULT_MODEL)
            .await
            .expect("bob");

        let titles: Vec<_> = list_conversations(&pool, alice)
            .await
            .expect("list")
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["second", "first"]);

        // Renaming bumps updated_at.
        set_title(&pool, first.id, "first, renamed")
            .await
            .expect("rename");
        let ids: Vec<_> = list_conversations(&pool, alice)
            .await
            .expect("list")
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn blank_rename_keeps_title() {
        let (pool, alice, _) = setup().await;
        let c = create_conversation(&pool, alice, "keep me", DEFAULT_MODEL)
            .await
            .expect("create");

        let same = rename_conversation(&pool, c, "   ").await.expect("rename");
        assert_eq!(same.title, "keep me");

        let renamed = rename_conversation(&pool, same, "  Trip plans ")
            .await
            .expect("rename");
        assert_eq!(renamed.title, "Trip plans");
    }

    #[tokio::test]
    async fn delete_cascades_to_messages() {
        let (pool, alice, bob) = setup().await;
        let c = create_conversation(&pool, alice, "doomed", DEFAULT_MODEL)
            .await
            .expect("create");
        insert_message(&pool, c.id, Role::User, "hi", None)
            .await
            .expect("user msg");
        insert_message(&pool, c.id, Role::Assistant, "hello", Some(12))
            .await
            .expect("assistant msg");

        assert!(!delete_conversation(&pool, bob, c.id).await.expect("bob delete"));
        assert!(delete_conversation(&pool, alice, c.id).await.expect("delete"));

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(&pool)
            .await
            .expect("count");
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn messages_come_back_in_insert_order() {
        let (pool, alice, _) = setup().await;
        let c = create_conversation(&pool, alice, "t", DEFAULT_MODEL)
            .await
            .expect("create");
        for (role, text) in [
            (Role::User, "one"),
            (Role::Assistant, "two"),
            (Role::User, "three"),
            (Role::Assistant, "four"),
        ] {
            insert_message(&pool, c.id, role, text, None)
                .await
                .expect("insert");
        }

        let contents: Vec<_> = list_messages(&pool, c.id)
            .await
            .expect("list")
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["one", "two", "three", "four"]);
        assert_eq!(count_messages(&pool, c.id, Role::User).await.expect("count"), 2);
    }

    #[tokio::test]
    async fn token_usage_is_stored() {
        let (pool, alice, _) = setup().await;
        let c = create_conversation(&pool, alice, "t", DEFAULT_MODEL)
            .await
            .expect("create");
        let m = insert_message(&pool, c.id, Role::Assistant, "ok", Some(42))
            .await
            .expect("insert");
        assert_eq!(m.tokens_used, Some(42));
        assert_eq!(m.role, Role::Assistant);
    }
}
