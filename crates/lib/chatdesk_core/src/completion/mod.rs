//! Completion client — turns a role-tagged history into one assistant reply.
//!
//! The client is chosen once at startup by [`client_from_config`] and handed
//! to request handlers as an `Arc<dyn CompletionClient>`:
//!
//! - `"openai"` — OpenAI chat completions API (requires the `openai` feature
//!   and an API key)
//! - `"demo"` — echoes the last user message; used when no key is configured

pub mod demo;
#[cfg(feature = "openai")]
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::models::chat::ChatTurn;

pub use demo::DemoClient;

/// Upper bound on generated tokens per reply.
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Default OpenAI-compatible API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Errors that can occur while calling a completion provider.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("{status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Parse(String),

    #[error("provider returned no choices")]
    EmptyResponse,
}

/// A generated reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    /// Total tokens billed for the call, when the provider reports it.
    pub tokens_used: Option<i64>,
}

/// Sends a conversation history to a language model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Human-readable provider name, used in error replies.
    fn provider_name(&self) -> &'static str;

    /// Generate the next assistant turn for `history` using `model`.
    async fn complete(
        &self,
        model: &str,
        history: &[ChatTurn],
    ) -> Result<Completion, CompletionError>;
}

/// Pick the completion client for the given credentials.
///
/// Falls back to [`DemoClient`] when the key is missing or blank, or when the
/// crate was built without the `openai` feature.
#[cfg_attr(not(feature = "openai"), allow(unused_variables))]
pub fn client_from_config(api_key: Option<&str>, base_url: &str) -> Arc<dyn CompletionClient> {
    match api_key.map(str::trim).filter(|k| !k.is_empty()) {
        #[cfg(feature = "openai")]
        Some(key) => {
            info!(base_url, "using OpenAI completion client");
            Arc::new(openai::OpenAiClient::new(key, base_url))
        }
        _ => {
            info!("no completion credentials available, running in demo mode");
            Arc::new(DemoClient)
        }
    }
}
