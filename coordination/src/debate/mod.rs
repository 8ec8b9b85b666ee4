//! Section Debate — Affirmative / Negative / Judge
//!
//! State machine for the three-role debate that produces one finalized
//! story section.
//!
//! # Debate Flow
//!
//! ```text
//! Start → Affirmative ──fail──────────────────────────→ Failed
//!              │                                       (section aborts)
//!              ▼
//!          Negative ──fail──→ Done (affirmative fallback)
//!              │
//!              ▼
//!           Judge ──fail / unparsable──→ Done (affirmative fallback)
//!              │
//!              ▼
//!            Done (judge's final_section)
//! ```

pub mod orchestrator;
pub mod record;
pub mod state;

pub use orchestrator::{DebateOrchestrator, SectionOutcome};
pub use record::{DebateLog, DebateRecord, FallbackReason, JudgeDecision, PreferredVersion};
pub use state::{DebatePhase, DebateSession, DebateTransition, TransitionError};
