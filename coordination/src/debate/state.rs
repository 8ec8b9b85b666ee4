//! Debate state machine — phases, transitions, and per-section session tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Phase of a section debate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebatePhase {
    /// Session created, no call made yet.
    Start,
    /// Affirmative writer is drafting.
    Affirmative,
    /// Negative critic is rewriting.
    Negative,
    /// Judge is choosing the final text.
    Judge,
    /// A final section text exists (possibly the affirmative fallback).
    Done,
    /// Affirmative draft failed; nothing to fall back to.
    Failed,
}

impl DebatePhase {
    /// Whether this is a terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Valid transitions from this phase.
    ///
    /// `Negative → Done` is the negative-failure fallback; `Judge → Done`
    /// covers both a real decision and the judge-failure fallback.
    pub fn valid_transitions(self) -> &'static [DebatePhase] {
        match self {
            Self::Start => &[Self::Affirmative],
            Self::Affirmative => &[Self::Negative, Self::Failed],
            Self::Negative => &[Self::Judge, Self::Done],
            Self::Judge => &[Self::Done],
            Self::Done | Self::Failed => &[],
        }
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Affirmative => write!(f, "affirmative"),
            Self::Negative => write!(f, "negative"),
            Self::Judge => write!(f, "judge"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A phase transition record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateTransition {
    pub from: DebatePhase,
    pub to: DebatePhase,
    pub timestamp: DateTime<Utc>,
    pub reason: String,
}

/// Error for invalid state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub from: DebatePhase,
    pub to: DebatePhase,
}

impl std::fmt::Display for TransitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid transition {} → {} (allowed: {:?})",
            self.from,
            self.to,
            self.from.valid_transitions()
        )
    }
}

impl std::error::Error for TransitionError {}

/// Phase and transition history for one section's debate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateSession {
    /// Outline index of the section being debated.
    pub section: u32,
    pub phase: DebatePhase,
    pub transitions: Vec<DebateTransition>,
    pub created_at: DateTime<Utc>,
}

impl DebateSession {
    pub fn new(section: u32) -> Self {
        Self {
            section,
            phase: DebatePhase::Start,
            transitions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Transition to a new phase with a reason.
    pub fn transition(&mut self, to: DebatePhase, reason: &str) -> Result<(), TransitionError> {
        if !self.phase.valid_transitions().contains(&to) {
            return Err(TransitionError {
                from: self.phase,
                to,
            });
        }

        self.transitions.push(DebateTransition {
            from: self.phase,
            to,
            timestamp: Utc::now(),
            reason: reason.to_string(),
        });
        self.phase = to;
        Ok(())
    }

    /// Whether the debate has ended.
    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }

    /// Ordered list of phases visited, starting with `Start`.
    pub fn path(&self) -> Vec<DebatePhase> {
        std::iter::once(DebatePhase::Start)
            .chain(self.transitions.iter().map(|t| t.to))
            .collect()
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] section {} | {} transitions",
            self.phase,
            self.section,
            self.transitions.len()
        )
    }
}
