//! Authentication service — login/register flows delegating to `chatdesk_core::auth`.

use chatdesk_core::auth::{jwt, password, queries};
use chatdesk_core::models::auth::User;
use sqlx::SqlitePool;
use tracing::info;

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};

pub use chatdesk_core::models::auth::TokenClaims;

/// Longest accepted username.
const USERNAME_MAX_CHARS: usize = 150;

/// Shortest accepted password.
const PASSWORD_MIN_CHARS: usize = 8;

/// Check registration fields, returning every problem found.
///
/// Username uniqueness needs the database and is checked by [`register`].
pub fn validate_registration(username: &str, password1: &str, password2: &str) -> Vec<String> {
    let mut errors = Vec::new();

    if username.is_empty() {
        errors.push("Username is required.".to_string());
    } else if username.chars().count() > USERNAME_MAX_CHARS {
        errors.push(format!(
            "Username must be at most {USERNAME_MAX_CHARS} characters."
        ));
    } else if !username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        errors.push("Username may contain only letters, numbers, and @/./+/-/_ characters.".to_string());
    }

    if password1 != password2 {
        errors.push("The two password fields didn't match.".to_string());
    } else if password1.chars().count() < PASSWORD_MIN_CHARS {
        errors.push(format!(
            "Password must be at least {PASSWORD_MIN_CHARS} characters."
        ));
    } else if password1.chars().all(|c| c.is_ascii_digit()) {
        errors.push("Password can't be entirely numeric.".to_string());
    }

    errors
}

/// Register a new user account.
///
/// Returns the validation messages as `Err(AppError::Validation)` joined by
/// newlines; callers rendering a form split them back out.
pub async fn register(
    pool: &SqlitePool,
    username: &str,
    password1: &str,
    password2: &str,
) -> AppResult<User> {
    let username = username.trim();
    let mut errors = validate_registration(username, password1, password2);
    if errors.is_empty() && queries::username_exists(pool, username).await? {
        errors.push("A user with that username already exists.".to_string());
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("\n")));
    }

    let pw_hash = password::hash_password(password1)?;
    let user = queries::create_user(pool, username, &pw_hash).await?;
    info!(user_id = user.id, username, "registered user");
    Ok(user)
}

/// Authenticate with username + password.
pub async fn login(pool: &SqlitePool, username: &str, password: &str) -> AppResult<User> {
    let found = queries::find_user_by_username(pool, username.trim()).await?;

    // Same error for unknown user and wrong password.
    match found {
        Some(u) if password::verify_password(password, &u.password_hash) => {
            info!(user_id = u.user.id, "user logged in");
            Ok(u.user)
        }
        _ => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}

/// Issue a signed session token for `user`.
pub fn issue_session_token(user: &User, config: &ApiConfig) -> AppResult<String> {
    jwt::generate_session_token(user, config.jwt_secret.as_bytes(), config.session_ttl_secs)
        .map_err(AppError::from)
}

/// Verify a session token.
pub fn verify_session_token(token: &str, config: &ApiConfig) -> Option<TokenClaims> {
    jwt::verify_session_token(token, config.jwt_secret.as_bytes())
}
