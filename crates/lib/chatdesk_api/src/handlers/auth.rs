//! Auth handlers — registration, login and logout pages.
//!
//! Successful registration and login set the session cookie and redirect;
//! failures re-render the form with its errors.

use axum::extract::{Form, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use chatdesk_core::models::auth::User;
use minijinja::context;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::safe_next;
use crate::models::{LoginForm, NextQuery, RegisterForm};
use crate::services::auth;
use crate::services::cookies::{clear_session_cookie, session_cookie};

const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

/// Set the session cookie for `user` and redirect to `target`.
fn start_session(state: &AppState, jar: CookieJar, user: &User, target: &str) -> AppResult<Response> {
    let token = auth::issue_session_token(user, &state.config)?;
    let jar = jar.add(session_cookie(
        &token,
        state.config.session_ttl_secs,
        state.config.secure_cookies,
    ));
    Ok((jar, Redirect::to(target)).into_response())
}

fn register_form(state: &AppState, errors: &[&str], username: &str) -> AppResult<Html<String>> {
    crate::views::render(
        &state.views,
        "register.html",
        context! { errors, username },
    )
}

fn login_form(
    state: &AppState,
    errors: &[&str],
    username: &str,
    next: &str,
) -> AppResult<Html<String>> {
    crate::views::render(
        &state.views,
        "login.html",
        context! { errors, username, next },
    )
}

/// `GET /register/`
pub async fn register_page(State(state): State<AppState>) -> AppResult<Html<String>> {
    register_form(&state, &[], "")
}

/// `POST /register/` — create the account and log it in.
pub async fn register_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    match auth::register(&state.pool, &form.username, &form.password1, &form.password2).await {
        Ok(user) => start_session(&state, jar, &user, "/"),
        Err(AppError::Validation(msg)) => {
            let errors: Vec<&str> = msg.lines().collect();
            Ok(register_form(&state, &errors, form.username.trim())?.into_response())
        }
        Err(e) => Err(e),
    }
}

/// `GET /login/`
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
) -> AppResult<Html<String>> {
    login_form(&state, &[], "", safe_next(query.next.as_deref()))
}

/// `POST /login/` — verify credentials and follow `next`.
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let next = safe_next(form.next.as_deref());
    match auth::login(&state.pool, &form.username, &form.password).await {
        Ok(user) => start_session(&state, jar, &user, next),
        Err(AppError::Unauthorized(_)) => {
            Ok(login_form(&state, &[INVALID_LOGIN], form.username.trim(), next)?.into_response())
        }
        Err(e) => Err(e),
    }
}

/// `POST /logout/` — clear the session cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(clear_session_cookie(state.config.secure_cookies));
    (jar, Redirect::to("/login/"))
}
