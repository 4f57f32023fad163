//! Text-completion capability and its OpenAI-compatible HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AiError;

/// One request to a completion capability: a fixed instruction describing
/// the expected output shape, plus the data it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub instruction: String,
    pub payload: String,
}

/// Anything that can answer a [`Prompt`] with free text.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    /// # Errors
    ///
    /// Returns [`AiError`] when the capability cannot produce an answer.
    async fn complete(&self, prompt: &Prompt) -> Result<String, AiError>;
}

/// Client for a `/v1/chat/completions` endpoint.
pub struct OpenAiCompatibleClient {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiCompatibleClient {
    /// Creates a client for the API rooted at `base_url` (without `/v1`).
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, AiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: format!("{}/v1/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl TextCompletion for OpenAiCompatibleClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, AiError> {
        let body = ChatRequest {
            model: &self.model,
            temperature: 0.1,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.payload,
                },
            ],
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AiError::Status {
                status: response.status().as_u16(),
                url: self.url.clone(),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}
