//! Authentication middleware — session cookie / Bearer token verification.
//!
//! Browsers authenticate with the `chatdesk_session` cookie set at login;
//! other clients may send the same token as `Authorization: Bearer <token>`.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;
use crate::error::AppError;
use crate::services::auth::verify_session_token;
use crate::services::cookies::SESSION_COOKIE;

/// The logged-in user, stored in request extensions by the middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub username: String,
}

/// Pull a session token from the cookie jar, falling back to a Bearer header.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE)
        && !cookie.value().is_empty()
    {
        return Some(cookie.value().to_string());
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Resolve the caller from request headers.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Option<AuthenticatedUser> {
    let token = extract_token(headers)?;
    let claims = verify_session_token(&token, &state.config)?;
    let id = claims.sub.parse().ok()?;
    Some(AuthenticatedUser {
        id,
        username: claims.username,
    })
}

/// Axum middleware for JSON endpoints: rejects anonymous callers with 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = authenticate(&state, request.headers())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Axum middleware for HTML pages: sends anonymous visitors to the login page.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()) {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => {
            let next_path = request
                .uri()
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            Redirect::to(&login_url(next_path)).into_response()
        }
    }
}

/// `/login/?next=<path>`, with the path form-encoded.
pub fn login_url(next_path: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next_path.as_bytes()).collect();
    format!("/login/?next={encoded}")
}

/// Accept a post-login redirect target only if it stays on this site.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") && !n.contains('\\') => n,
        _ => "/",
    }
}
