//! # chatdesk_api
//!
//! HTTP API and server-rendered web UI for Chatdesk.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use chatdesk_core::completion::CompletionClient;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, chat, conversations, pages};
use crate::views::Views;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool.
    pub pool: SqlitePool,
    /// API configuration.
    pub config: ApiConfig,
    /// Completion provider (OpenAI or demo).
    pub completion: Arc<dyn CompletionClient>,
    /// Loaded HTML templates.
    pub views: Arc<Views>,
}

impl AppState {
    /// Build state, loading the HTML templates.
    pub fn new(
        pool: SqlitePool,
        config: ApiConfig,
        completion: Arc<dyn CompletionClient>,
    ) -> Result<Self, minijinja::Error> {
        Ok(Self {
            pool,
            config,
            completion,
            views: Arc::new(views::load_views()?),
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `chatdesk_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    chatdesk_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public = Router::new()
        .route(
            routes::REGISTER,
            get(auth::register_page).post(auth::register_submit),
        )
        .route(routes::LOGIN, get(auth::login_page).post(auth::login_submit))
        .route(routes::POST_LOGOUT, post(auth::logout))
        .route(routes::GET_CHAT_JS, get(pages::chat_js));

    // HTML pages (anonymous visitors are redirected to the login page)
    let page_routes = Router::new()
        .route(routes::GET_INDEX, get(pages::index))
        .route(routes::GET_CONVERSATION, get(pages::conversation_view))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_session,
        ));

    // JSON API (anonymous callers get 401)
    let api = Router::new()
        .route(
            routes::POST_API_CONVERSATIONS_NEW,
            post(conversations::new_conversation_handler),
        )
        .route(
            routes::DELETE_API_CONVERSATION,
            delete(conversations::delete_conversation_handler),
        )
        .route(
            routes::PATCH_API_CONVERSATION_RENAME,
            patch(conversations::rename_conversation_handler),
        )
        .route(
            routes::GET_API_CONVERSATION_MESSAGES,
            get(conversations::list_messages_handler),
        )
        .route(routes::POST_API_SEND, post(chat::send_message_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(page_routes)
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
