//! Debate audit trail — judge decisions, per-section records, and the run log.

use serde::{Deserialize, Deserializer, Serialize};

use super::state::DebateTransition;

/// Which draft the judge preferred.
///
/// Serialized lowercase; parsed case-insensitively since models often
/// capitalize the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredVersion {
    Affirmative,
    Negative,
    /// The judge merged both drafts into a new text.
    Refined,
}

impl std::fmt::Display for PreferredVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Affirmative => write!(f, "affirmative"),
            Self::Negative => write!(f, "negative"),
            Self::Refined => write!(f, "refined"),
        }
    }
}

impl std::str::FromStr for PreferredVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "affirmative" => Ok(Self::Affirmative),
            "negative" => Ok(Self::Negative),
            "refined" => Ok(Self::Refined),
            other => Err(format!(
                "unknown preferred_version '{other}' (expected affirmative|negative|refined)"
            )),
        }
    }
}

impl<'de> Deserialize<'de> for PreferredVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Structured judge answer. `final_section` is authoritative whichever
/// version was preferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgeDecision {
    pub preferred_version: PreferredVersion,
    #[serde(default)]
    pub reasoning: String,
    pub final_section: String,
}

/// Why a section ended on the affirmative draft instead of a judge decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NegativeFailed,
    JudgeFailed,
}

impl std::fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeFailed => write!(f, "negative_failed"),
            Self::JudgeFailed => write!(f, "judge_failed"),
        }
    }
}

/// Audit entry for one completed section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateRecord {
    #[serde(rename = "section")]
    pub section_index: u32,
    pub title: String,
    pub affirmative_draft: String,
    pub negative_draft: Option<String>,
    pub judge_decision: Option<JudgeDecision>,
    /// Text that entered the story and the context for later sections.
    pub final_section: String,
    /// Set when the affirmative draft was used as a fallback.
    pub degraded: bool,
    pub fallback: Option<FallbackReason>,
    #[serde(default)]
    pub transitions: Vec<DebateTransition>,
}

impl DebateRecord {
    /// Compact summary line.
    pub fn summary_line(&self) -> String {
        let verdict = match (&self.judge_decision, self.fallback) {
            (Some(decision), _) => decision.preferred_version.to_string(),
            (None, Some(reason)) => format!("fallback:{reason}"),
            (None, None) => "fallback".to_string(),
        };
        format!(
            "[section {}] {} | {} | {} chars",
            self.section_index,
            self.title,
            verdict,
            self.final_section.chars().count()
        )
    }
}

/// Ordered, append-only collection of debate records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DebateLog {
    records: Vec<DebateRecord>,
}

impl DebateLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: DebateRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[DebateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of sections that fell back to the affirmative draft.
    pub fn degraded_count(&self) -> usize {
        self.records.iter().filter(|r| r.degraded).count()
    }

    /// Persisted form: a JSON array of records in completion order.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.records).unwrap_or_else(|_| "[]".to_string())
    }
}
