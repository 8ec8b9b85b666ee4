//! Language-model capability — the one seam between the pipeline and a
//! provider.
//!
//! The pipeline only needs "send a prompt, get text and usage back". Provider
//! specifics (HTTP shape, auth, timeouts) live behind [`LanguageModel`]
//! implementations outside this crate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::error::{StoryError, StoryResult};
use crate::settings::GenerationSettings;
use crate::usage::UsageTracker;

/// Errors reported by a [`LanguageModel`] implementation.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Request(String),

    #[error("completion response could not be decoded: {0}")]
    Decode(String),

    #[error("language model misconfigured: {0}")]
    Misconfigured(String),
}

/// Which prompt template and usage bucket a call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    /// Turns the raw prompt into a structured outline.
    OutlineGenerator,
    /// Writes the first draft of a section.
    AffirmativeWriter,
    /// Critiques the first draft and writes a competing version.
    NegativeCritic,
    /// Picks or merges the two drafts into the final section.
    JudgeEditor,
    /// Writes a section in one call (outlined mode, no debate).
    SectionWriter,
    /// Writes the whole story in one call (basic mode, no outline).
    StoryWriter,
}

impl AgentRole {
    /// Every role, in pipeline order.
    pub const ALL: [AgentRole; 6] = [
        Self::OutlineGenerator,
        Self::AffirmativeWriter,
        Self::NegativeCritic,
        Self::JudgeEditor,
        Self::SectionWriter,
        Self::StoryWriter,
    ];

    /// Snake-case identifier, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OutlineGenerator => "outline_generator",
            Self::AffirmativeWriter => "affirmative_writer",
            Self::NegativeCritic => "negative_critic",
            Self::JudgeEditor => "judge_editor",
            Self::SectionWriter => "section_writer",
            Self::StoryWriter => "story_writer",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token counts reported for a single call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64, total_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens,
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Full prompt text, sent as one user message.
    pub prompt: String,
    /// Role issuing the call.
    pub role: AgentRole,
    /// Sampling temperature.
    pub temperature: f32,
    /// Optional completion cap.
    pub max_tokens: Option<u32>,
}

/// What came back from the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Generated text. May be empty; callers decide whether that is a failure.
    pub text: String,
    /// Usage metadata, when the provider reports it.
    pub usage: Option<TokenUsage>,
}

impl Completion {
    /// Completion text with surrounding whitespace removed, or `None` when
    /// nothing usable came back.
    pub fn usable_text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Stateless text-completion capability.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run one completion. Implementations enforce their own timeouts; a
    /// timed-out call is reported as an error.
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError>;

    /// Model identifier, for logs.
    fn model_name(&self) -> &str;
}

/// Send one prompt for `role` and return its non-empty, trimmed text.
///
/// Usage is recorded whenever a response arrives, even an empty one.
/// Capability errors and blank responses both map to `EmptyResponse`.
pub(crate) async fn complete_text(
    model: &dyn LanguageModel,
    settings: &GenerationSettings,
    role: AgentRole,
    prompt: String,
    usage: &mut UsageTracker,
) -> StoryResult<String> {
    let request = CompletionRequest {
        prompt,
        role,
        temperature: settings.temperature,
        max_tokens: settings.max_tokens_for(role),
    };

    info!(role = %role, model = model.model_name(), "Making API call");
    let completion = match model.complete(request).await {
        Ok(completion) => completion,
        Err(e) => {
            warn!(role = %role, error = %e, "Error calling model");
            return Err(StoryError::EmptyResponse { role });
        }
    };
    usage.record(role, completion.usage);

    match completion.usable_text() {
        Some(text) => Ok(text.to_string()),
        None => {
            warn!(role = %role, "Empty response from model");
            Err(StoryError::EmptyResponse { role })
        }
    }
}
