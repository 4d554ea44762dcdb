//! User queries.

use chrono::Utc;
use sqlx::SqlitePool;

use super::AuthError;
use crate::models::auth::{User, UserWithPassword};

#[derive(sqlx::FromRow)]
struct UserPasswordRow {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

/// Fetch a user and their password hash by username.
pub async fn find_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<UserWithPassword>, AuthError> {
    let row = sqlx::query_as::<_, UserPasswordRow>(
        "SELECT id, username, created_at, password_hash FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|r| UserWithPassword {
        user: r.user,
        password_hash: r.password_hash,
    }))
}

/// Create a new user.
pub async fn create_user(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
) -> Result<User, AuthError> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?) \
         RETURNING id, username, created_at",
    )
    .bind(username)
    .bind(password_hash)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;
    Ok(user)
}

/// Check whether a username is already taken.
pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool, AuthError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE username = ?")
        .bind(username)
        .fetch_one(pool)
        .await?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::migrate::migrate;

    #[tokio::test]
    async fn create_and_find_user() {
        let pool = connect_in_memory().await.expect("connect");
        migrate(&pool).await.expect("migrate");

        assert!(!username_exists(&pool, "alice").await.expect("exists"));
        let user = create_user(&pool, "alice", "$2b$hash").await.expect("create");
        assert!(username_exists(&pool, "alice").await.expect("exists"));

        let found = find_user_by_username(&pool, "alice")
            .await
            .expect("find")
            .expect("some");
        assert_eq!(found.user.id, user.id);
        assert_eq!(found.password_hash, "$2b$hash");

        assert_eq!(found.user.username, "alice");
        assert!(find_user_by_username(&pool, "bob").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn duplicate_username_fails() {
        let pool = connect_in_memory().await.expect("connect");
        migrate(&pool).await.expect("migrate");

        create_user(&pool, "alice", "h").await.expect("first");
        assert!(matches!(
            create_user(&pool, "alice", "h").await,
            Err(AuthError::DbError(_))
        ));
    }
}
