//! Story Coordination Library
//!
//! This library provides the orchestration core of the debate story
//! generator:
//! - Outline generation from a free-text prompt
//! - Three-role section debate (affirmative writer, negative critic, judge)
//!   with affirmative fallback when later roles fail
//! - Narrative context accumulation across sections
//! - Single-call "outlined" and "basic" modes that skip the debate
//! - Per-role token usage accounting
//! - Story assembly and the full debate audit log
//!
//! The language model is an injected [`LanguageModel`]; this crate performs
//! no IO of its own.
//!
//! # Pipeline
//!
//! ```text
//! prompt ─→ OutlineGenerator ─→ Outline (N sections)
//!                                  │
//!          ┌───────────────────────┘
//!          ▼
//!   for each SectionSpec:
//!     DebateOrchestrator(context 1..k-1) ─→ final text ─→ ContextAccumulator
//!                                       └─→ DebateRecord ─→ DebateLog
//!          │ (affirmative failure stops the loop)
//!          ▼
//!   StoryAssembler ─→ StoryDocument
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod context;
pub mod debate;
pub mod decode;
pub mod error;
pub mod llm;
pub mod outline;
pub mod pipeline;
pub mod prompts;
pub mod settings;
pub mod story;
pub mod usage;

pub use context::ContextAccumulator;
pub use debate::{
    DebateLog, DebateOrchestrator, DebatePhase, DebateRecord, FallbackReason, JudgeDecision,
    PreferredVersion, SectionOutcome,
};
pub use decode::{decode_json, strip_code_fence, DecodeError};
pub use error::{ErrorKind, StoryError, StoryResult};
pub use llm::{AgentRole, Completion, CompletionRequest, LanguageModel, LlmError, TokenUsage};
pub use outline::{Outline, OutlineGenerator, SectionSpec};
pub use pipeline::{
    NoopObserver, PipelineDriver, PipelineFailure, PipelineObserver, PipelineRun, StoppedAt,
};
pub use settings::{GenerationMode, GenerationSettings};
pub use story::{StoryAssembler, StoryDocument, StorySection};
pub use usage::{CostRates, RoleUsage, UsageTotals, UsageTracker};
