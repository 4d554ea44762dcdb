//! OpenAI chat completion client.
//!
//! Calls `/chat/completions` once per reply, without retries. Any failure is
//! returned to the caller, which turns it into reply text.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Completion, CompletionClient, CompletionError, MAX_OUTPUT_TOKENS};
use crate::models::chat::ChatTurn;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: i64,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the OpenAI chat completions API (or a compatible endpoint).
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAiClient {
    /// Create a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        }
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Pull the human-readable message out of an OpenAI error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Convert a successful response body into a [`Completion`].
fn parse_completion(data: ChatCompletionResponse) -> Result<Completion, CompletionError> {
    let choice = data
        .choices
        .into_iter()
        .next()
        .ok_or(CompletionError::EmptyResponse)?;

    Ok(Completion {
        content: choice.message.content.unwrap_or_default(),
        tokens_used: data.usage.map(|u| u.total_tokens),
    })
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn provider_name(&self) -> &'static str {
        "OpenAI"
    }

    async fn complete(
        &self,
        model: &str,
        history: &[ChatTurn],
    ) -> Result<Completion, CompletionError> {
        debug!(model, turns = history.len(), "requesting chat completion");

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ChatCompletionRequest {
                model,
                messages: history,
                max_tokens: MAX_OUTPUT_TOKENS,
            })
            .send()
            .await
            .map_err(|e| CompletionError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(CompletionError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let data: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        parse_completion(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::Role;

    #[test]
    fn request_body_matches_api_shape() {
        let history = vec![ChatTurn {
            role: Role::User,
            content: "hi".into(),
        }];
        let body = serde_json::to_value(ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: &history,
            max_tokens: MAX_OUTPUT_TOKENS,
        })
        .expect("serialize");

        assert_eq!(
            body,
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "hi"}],
                "max_tokens": 2048
            })
        );
    }

    #[test]
    fn first_choice_and_usage_are_used() {
        let data: ChatCompletionResponse = serde_json::from_str(
            r#"{
                "choices": [
                    {"message": {"role": "assistant", "content": "Hello!"}},
                    {"message": {"role": "assistant", "content": "ignored"}}
                ],
                "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
            }"#,
        )
        .expect("parse");

        let completion = parse_completion(data).expect("completion");
        assert_eq!(completion.content, "Hello!");
        assert_eq!(completion.tokens_used, Some(12));
    }

    #[test]
    fn missing_usage_is_none() {
        let data: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "ok"}}]}"#)
                .expect("parse");
        assert_eq!(parse_completion(data).expect("completion").tokens_used, None);
    }

    #[test]
    fn empty_choices_is_an_error() {
        let data: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).expect("parse");
        assert!(matches!(
            parse_completion(data),
            Err(CompletionError::EmptyResponse)
        ));
    }

    #[test]
    fn error_message_prefers_api_message() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Incorrect API key provided");
        assert_eq!(error_message(" bad gateway \n"), "bad gateway");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client = OpenAiClient::new("sk", "http://localhost:8080/v1/");
        assert_eq!(client.endpoint, "http://localhost:8080/v1/chat/completions");
    }
}
