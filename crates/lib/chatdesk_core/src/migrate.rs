//! Database migration support.
//!
//! Embeds and runs SQL migrations from `chatdesk_core/migrations/`.

use sqlx::SqlitePool;

/// Run all embedded database migrations against the given pool.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn creates_chat_tables() {
        let pool = connect_in_memory().await.expect("connect");
        migrate(&pool).await.expect("migrate");

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' AND name != '_sqlx_migrations' \
             ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .expect("list tables");

        assert_eq!(tables, vec!["conversations", "messages", "users"]);
    }
}
