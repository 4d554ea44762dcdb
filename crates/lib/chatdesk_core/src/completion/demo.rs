//! Demo completion client — echoes the user instead of calling a provider.

use async_trait::async_trait;

use super::{Completion, CompletionClient, CompletionError};
use crate::models::chat::{ChatTurn, Role};

/// Marker that prefixes every demo reply.
pub const DEMO_MARKER: &str = "[DEMO MODE - No API Key]";

/// Stand-in client used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoClient;

/// Build the demo reply for a user message.
pub fn demo_reply(message: &str) -> String {
    format!(
        "{DEMO_MARKER} You said: \"{message}\"\n\n\
         To enable real AI responses, set the OPENAI_API_KEY environment variable \
         and restart the server."
    )
}

#[async_trait]
impl CompletionClient for DemoClient {
    fn provider_name(&self) -> &'static str {
        "demo"
    }

    async fn complete(
        &self,
        _model: &str,
        history: &[ChatTurn],
    ) -> Result<Completion, CompletionError> {
        let last_user = history
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map(|turn| turn.content.as_str())
            .unwrap_or_default();

        Ok(Completion {
            content: demo_reply(last_user),
            tokens_used: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_latest_user_message() {
        let history = vec![
            ChatTurn {
                role: Role::User,
                content: "first".into(),
            },
            ChatTurn {
                role: Role::Assistant,
                content: "reply".into(),
            },
            ChatTurn {
                role: Role::User,
                content: "hello".into(),
            },
        ];
        let completion = DemoClient
            .complete("gpt-4o-mini", &history)
            .await
            .expect("demo never fails");

        assert!(completion.content.contains("DEMO MODE"));
        assert!(completion.content.contains("\"hello\""));
        assert!(!completion.content.contains("first"));
        assert_eq!(completion.tokens_used, None);
    }
}
