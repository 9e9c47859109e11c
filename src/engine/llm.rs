//! The language model behind the reasoning loop.
//!
//! The loop only needs "messages in, text out". [`ChatClient`] provides that
//! over an OpenAI-compatible `/chat/completions` endpoint such as DeepSeek.

use crate::error::{Error, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Chat message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// A chat model. Implementations must be safe to share across requests.
pub trait LanguageModel: Send + Sync {
    /// Return the assistant text for `request`.
    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> BoxFuture<'a, Result<String>>;
}

/// Default DeepSeek endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";

/// HTTP client for OpenAI-compatible chat-completions APIs.
#[derive(Clone)]
pub struct ChatClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatClient {
    /// Create a client. `timeout` bounds each HTTP call.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn send(&self, request: &CompletionRequest) -> Result<String> {
        let response = self
            .agent
            .post(&self.endpoint())
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .send_json(request);

        let mut response = match response {
            Ok(resp) => resp,
            Err(ureq::Error::StatusCode(code)) => {
                return Err(Error::Model(format!("HTTP error {}", code)));
            }
            Err(ureq::Error::Timeout(_)) => return Err(Error::Timeout(self.timeout)),
            Err(e) => return Err(Error::Model(format!("Request error: {}", e))),
        };

        let data: ChatResponse = response
            .body_mut()
            .read_json()
            .map_err(|e| Error::Model(format!("Error parsing response: {}", e)))?;

        data.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Model("Response contained no message content".to_string()))
    }
}

impl LanguageModel for ChatClient {
    fn complete<'a>(&'a self, request: &'a CompletionRequest) -> BoxFuture<'a, Result<String>> {
        let client = self.clone();
        let request = request.clone();
        Box::pin(async move {
            // A cancelled request leaves this call running until the agent's
            // timeout fires; its result is then dropped.
            tokio::task::spawn_blocking(move || client.send(&request))
                .await
                .map_err(|e| Error::Model(format!("Request task failed: {}", e)))?
        })
    }
}
