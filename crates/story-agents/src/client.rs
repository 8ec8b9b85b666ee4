//! OpenAI-compatible chat-completions client.
//!
//! One user message per request, no streaming, no retries. Works against
//! Gemini's OpenAI surface as well as local llama.cpp / vLLM servers.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use story_coordination::{Completion, CompletionRequest, LanguageModel, LlmError, TokenUsage};
use tracing::debug;

use crate::config::{EndpointConfig, StoryConfig};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatRequest<'a> {
    pub fn new(
        model: &'a str,
        reasoning_effort: Option<&'a str>,
        request: &'a CompletionRequest,
    ) -> Self {
        Self {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            reasoning_effort,
        }
    }
}

/// The subset of the response body the generator reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

impl ChatResponse {
    /// First choice's content (empty when absent) plus usage.
    pub fn into_completion(self) -> Completion {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .unwrap_or_default();
        Completion {
            text,
            usage: self
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens, u.total_tokens)),
        }
    }
}

/// `{base_url}/chat/completions`, tolerant of a trailing slash.
pub fn chat_completions_url(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

/// [`LanguageModel`] over an OpenAI-compatible HTTP endpoint.
pub struct OpenAiCompatClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    reasoning_effort: Option<String>,
}

impl OpenAiCompatClient {
    pub fn new(endpoint: &EndpointConfig, api_key: impl Into<String>) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()
            .map_err(|e| LlmError::Misconfigured(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: chat_completions_url(&endpoint.base_url),
            api_key: api_key.into(),
            model: endpoint.model.clone(),
            reasoning_effort: endpoint.reasoning_effort.clone(),
        })
    }

    pub fn from_config(config: &StoryConfig) -> Result<Self, LlmError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| LlmError::Misconfigured("no API key configured".into()))?;
        Self::new(&config.endpoint, api_key)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        let start = std::time::Instant::now();
        let body = ChatRequest::new(&self.model, self.reasoning_effort.as_deref(), &request);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Request(format!("API error ({status}): {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Decode(e.to_string()))?;

        debug!(
            role = %request.role,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "chat completion returned"
        );
        Ok(parsed.into_completion())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
