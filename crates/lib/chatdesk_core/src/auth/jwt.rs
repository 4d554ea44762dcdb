//! Session token (JWT) generation and verification.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};

use super::AuthError;
use crate::models::auth::{TokenClaims, User};

/// Session lifetime: 14 days.
pub const SESSION_EXPIRY_SECS: i64 = 14 * 24 * 60 * 60;

/// Generate a signed session token (HS256) for `user`.
pub fn generate_session_token(
    user: &User,
    secret: &[u8],
    lifetime_secs: i64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user.id.to_string(),
        username: user.username.clone(),
        exp: (now + Duration::seconds(lifetime_secs)).timestamp(),
        iat: now.timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Verify a session token, returning the claims on success.
pub fn verify_session_token(token: &str, secret: &[u8]) -> Option<TokenClaims> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<TokenClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
}

/// Resolve the JWT secret: env var `JWT_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    // Generate and persist
    let secret_path = jwt_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    match persist_secret(&secret_path, &secret) {
        Ok(()) => info!(path = %secret_path.display(), "generated new JWT secret"),
        Err(e) => warn!(
            path = %secret_path.display(),
            error = %e,
            "generated JWT secret could not be saved; sessions will not survive a restart"
        ),
    }
    secret
}

/// Write `secret` to `path`, creating parent directories.
fn persist_secret(path: &Path, secret: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, secret)
}

/// Path to the persisted JWT secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chatdesk")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: 7,
            username: "alice".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_claims() {
        let token = generate_session_token(&alice(), b"secret", SESSION_EXPIRY_SECS).expect("sign");
        let claims = verify_session_token(&token, b"secret").expect("verify");
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_session_token(&alice(), b"secret", SESSION_EXPIRY_SECS).expect("sign");
        assert!(verify_session_token(&token, b"other").is_none());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default 60s leeway.
        let token = generate_session_token(&alice(), b"secret", -3600).expect("sign");
        assert!(verify_session_token(&token, b"secret").is_none());
    }

    #[test]
    fn persist_secret_reports_write_failures() {
        let dir = std::env::temp_dir().join(format!("chatdesk-jwt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("mkdir");

        let saved = dir.join("nested").join("jwt-secret");
        persist_secret(&saved, "s3cret").expect("persist");
        assert_eq!(std::fs::read_to_string(&saved).expect("read"), "s3cret");

        // A regular file where a directory is needed.
        let blocker = dir.join("blocker");
        std::fs::write(&blocker, "x").expect("write blocker");
        assert!(persist_secret(&blocker.join("jwt-secret"), "s3cret").is_err());

        std::fs::remove_dir_all(&dir).expect("cleanup");
    }
}
