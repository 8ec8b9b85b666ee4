//! Outline generation — free-text prompt to a fixed-cardinality plan.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::decode::{decode_json, DecodeError};
use crate::error::{StoryError, StoryResult};
use crate::llm::{complete_text, AgentRole, LanguageModel};
use crate::prompts;
use crate::settings::GenerationSettings;
use crate::usage::UsageTracker;

/// Title used when the model omits one.
pub const DEFAULT_TITLE: &str = "Untitled Story";

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

/// One planned section. Immutable once the outline exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// 1-based position in the outline.
    #[serde(rename = "section")]
    pub index: u32,
    pub title: String,
    pub summary: String,
}

/// Story title plus ordered section plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(rename = "outline")]
    pub sections: Vec<SectionSpec>,
}

impl Outline {
    /// Check cardinality and that indices run 1..=N in order.
    pub fn validate(&self, expected_sections: u32) -> StoryResult<()> {
        if self.sections.len() != expected_sections as usize {
            return Err(StoryError::OutlineInvalid {
                reason: format!(
                    "expected {} sections, got {}",
                    expected_sections,
                    self.sections.len()
                ),
            });
        }

        for (position, section) in self.sections.iter().enumerate() {
            let expected = position as u32 + 1;
            if section.index != expected {
                return Err(StoryError::OutlineInvalid {
                    reason: format!(
                        "section at position {} has index {}",
                        expected, section.index
                    ),
                });
            }
        }

        Ok(())
    }

    /// Parse a model response or a previously persisted outline.
    pub fn from_json(raw: &str) -> StoryResult<Self> {
        decode_json(raw).map_err(|e| match e {
            DecodeError::Empty => StoryError::EmptyResponse {
                role: AgentRole::OutlineGenerator,
            },
            DecodeError::Json(reason) => StoryError::OutlineParse { reason },
        })
    }

    /// Persisted form: `{"title": …, "outline": [{section, title, summary}, …]}`.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Asks the model for an outline and validates it.
pub struct OutlineGenerator<'a> {
    model: &'a dyn LanguageModel,
    settings: &'a GenerationSettings,
}

impl<'a> OutlineGenerator<'a> {
    pub fn new(model: &'a dyn LanguageModel, settings: &'a GenerationSettings) -> Self {
        Self { model, settings }
    }

    pub async fn generate(&self, prompt_text: &str, usage: &mut UsageTracker) -> StoryResult<Outline> {
        info!(
            model = self.model.model_name(),
            sections = self.settings.section_count,
            "Generating story outline"
        );

        let text = complete_text(
            self.model,
            self.settings,
            AgentRole::OutlineGenerator,
            prompts::outline_prompt(prompt_text, self.settings.section_count),
            usage,
        )
        .await?;

        let outline = Outline::from_json(&text).map_err(|e| {
            warn!(error = %e, raw = %text, "Error parsing outline response");
            e
        })?;
        outline.validate(self.settings.section_count)?;

        info!(title = %outline.title, sections = outline.len(), "Outline generated");
        for section in &outline.sections {
            info!(
                section = section.index,
                title = %section.title,
                summary = %section.summary,
                "  outline entry"
            );
        }

        Ok(outline)
    }
}
