//! Generation settings shared by every step of a run.

use serde::{Deserialize, Serialize};

use crate::llm::AgentRole;

/// How each outline entry is turned into a finished section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Affirmative → negative → judge for every section.
    #[default]
    Debate,
    /// One writer call per section.
    Outlined,
    /// One call for the whole story, no outline.
    Basic,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Debate => write!(f, "debate"),
            Self::Outlined => write!(f, "outlined"),
            Self::Basic => write!(f, "basic"),
        }
    }
}

impl std::str::FromStr for GenerationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debate" => Ok(Self::Debate),
            "outlined" => Ok(Self::Outlined),
            "basic" => Ok(Self::Basic),
            other => Err(format!(
                "unknown generation mode '{other}' (expected debate|outlined|basic)"
            )),
        }
    }
}

/// Fixed per-run constants consumed at the capability boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Outline cardinality.
    pub section_count: u32,
    /// Sampling temperature for every call.
    pub temperature: f32,
    pub mode: GenerationMode,
    /// Completion cap for the outline call.
    pub outline_max_tokens: Option<u32>,
    /// Completion cap for affirmative, negative, section-writer and
    /// story-writer calls.
    pub section_max_tokens: Option<u32>,
    /// Completion cap for the judge call.
    pub judge_max_tokens: Option<u32>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            section_count: 6,
            temperature: 0.7,
            mode: GenerationMode::Debate,
            outline_max_tokens: None,
            section_max_tokens: None,
            judge_max_tokens: None,
        }
    }
}

impl GenerationSettings {
    pub fn max_tokens_for(&self, role: AgentRole) -> Option<u32> {
        match role {
            AgentRole::OutlineGenerator => self.outline_max_tokens,
            AgentRole::AffirmativeWriter
            | AgentRole::NegativeCritic
            | AgentRole::SectionWriter
            | AgentRole::StoryWriter => self.section_max_tokens,
            AgentRole::JudgeEditor => self.judge_max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GenerationSettings::default();
        assert_eq!(settings.section_count, 6);
        assert_eq!(settings.mode, GenerationMode::Debate);
        assert!((settings.temperature - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_max_tokens_routing() {
        let settings = GenerationSettings {
            outline_max_tokens: Some(1500),
            section_max_tokens: Some(2000),
            judge_max_tokens: Some(4000),
            ..Default::default()
        };
        assert_eq!(settings.max_tokens_for(AgentRole::OutlineGenerator), Some(1500));
        assert_eq!(settings.max_tokens_for(AgentRole::NegativeCritic), Some(2000));
        assert_eq!(settings.max_tokens_for(AgentRole::SectionWriter), Some(2000));
        assert_eq!(settings.max_tokens_for(AgentRole::StoryWriter), Some(2000));
        assert_eq!(settings.max_tokens_for(AgentRole::JudgeEditor), Some(4000));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("outlined".parse::<GenerationMode>().unwrap(), GenerationMode::Outlined);
        assert_eq!("basic".parse::<GenerationMode>().unwrap(), GenerationMode::Basic);
        assert!("single".parse::<GenerationMode>().is_err());
        assert_eq!(GenerationMode::Debate.to_string(), "debate");
    }
}
