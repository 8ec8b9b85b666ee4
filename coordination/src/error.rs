//! Pipeline error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::AgentRole;

/// Result type alias for pipeline operations
pub type StoryResult<T> = Result<T, StoryError>;

/// Failures that can stop an outline, a section, or a whole run.
///
/// Negative-critic and judge failures never surface here: the debate
/// recovers from them by falling back to the affirmative draft.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    /// Prompt text was blank.
    #[error("story prompt is empty")]
    EmptyPrompt,

    /// The model returned nothing usable (or the call itself failed).
    #[error("{role} returned no usable text")]
    EmptyResponse { role: AgentRole },

    /// Outline response was not valid outline JSON.
    #[error("could not parse outline: {reason}")]
    OutlineParse { reason: String },

    /// Outline parsed but breaks the cardinality/index invariants.
    #[error("outline is malformed: {reason}")]
    OutlineInvalid { reason: String },

    /// Judge response was not a valid decision.
    #[error("could not parse judge decision: {reason}")]
    JudgeParse { reason: String },

    /// No affirmative draft, so nothing to fall back to.
    #[error("affirmative draft failed for section {section}: {reason}")]
    AffirmativeFailed { section: u32, reason: String },

    /// The outline was produced but not a single section completed.
    #[error("no sections generated (stopped at section {section})")]
    NoSectionsGenerated { section: u32 },
}

/// Flat classification of [`StoryError`], used in reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyPrompt,
    EmptyResponse,
    OutlineParseError,
    OutlineInvalid,
    JudgeParseError,
    AffirmativeFailed,
    NoSectionsGenerated,
}

impl StoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyPrompt => ErrorKind::EmptyPrompt,
            Self::EmptyResponse { .. } => ErrorKind::EmptyResponse,
            Self::OutlineParse { .. } => ErrorKind::OutlineParseError,
            Self::OutlineInvalid { .. } => ErrorKind::OutlineInvalid,
            Self::JudgeParse { .. } => ErrorKind::JudgeParseError,
            Self::AffirmativeFailed { .. } => ErrorKind::AffirmativeFailed,
            Self::NoSectionsGenerated { .. } => ErrorKind::NoSectionsGenerated,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPrompt => write!(f, "empty_prompt"),
            Self::EmptyResponse => write!(f, "empty_response"),
            Self::OutlineParseError => write!(f, "outline_parse_error"),
            Self::OutlineInvalid => write!(f, "outline_invalid"),
            Self::JudgeParseError => write!(f, "judge_parse_error"),
            Self::AffirmativeFailed => write!(f, "affirmative_failed"),
            Self::NoSectionsGenerated => write!(f, "no_sections_generated"),
        }
    }
}
