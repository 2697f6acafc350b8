//! Chat-completion client for commit explanations.

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;

use crate::error::ExplainerError;

use super::config::ExplainerConfig;

/// Something that turns a system + user message into an assistant reply.
///
/// This abstraction allows swapping the model service in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Explainer: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ExplainerError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Client for OpenAI-compatible `/chat/completions` endpoints.
pub struct ChatCompletionClient {
    http: reqwest::Client,
    api_key: String,
    config: ExplainerConfig,
}

impl ChatCompletionClient {
    /// Create a client. Fails when no API key is configured.
    pub fn new(config: ExplainerConfig) -> Result<Self, ExplainerError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(ExplainerError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .user_agent(concat!("explain-commits/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ExplainerError::Transport)?;

        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    async fn send(&self, system: &str, user: &str) -> Result<String, ExplainerError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature,
        };

        let endpoint = self.config.endpoint();
        debug!(
            "POST {} (model={}, prompt={} chars)",
            endpoint,
            self.config.model,
            system.len() + user.len()
        );

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(ExplainerError::Transport)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            return Err(ExplainerError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(500).collect();
            return Err(ExplainerError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(ExplainerError::Transport)?;
        parse_chat_response(&bytes)
    }
}

#[async_trait]
impl Explainer for ChatCompletionClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String, ExplainerError> {
        let limit = self.config.timeout;
        timeout(limit, self.send(system, user))
            .await
            .map_err(|_| ExplainerError::Timeout(limit.as_secs()))?
    }
}

/// Extract the assistant text from a chat-completion response body.
fn parse_chat_response(body: &[u8]) -> Result<String, ExplainerError> {
    let response: ChatResponse = serde_json::from_slice(body)
        .map_err(|e| ExplainerError::InvalidResponse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(ExplainerError::EmptyResponse)
}
