//! Debate orchestrator — drives affirmative → negative → judge for one section.
//!
//! Only the affirmative draft is mandatory. A failed negative or judge call
//! ends the debate early with the affirmative draft as the section text,
//! and the record says so (`degraded`, `fallback`).

use tracing::{info, warn};

use super::record::{DebateRecord, FallbackReason, JudgeDecision};
use super::state::{DebatePhase, DebateSession};
use crate::decode::{decode_json, DecodeError};
use crate::error::{StoryError, StoryResult};
use crate::llm::{complete_text, AgentRole, LanguageModel};
use crate::outline::SectionSpec;
use crate::prompts;
use crate::settings::GenerationSettings;
use crate::usage::UsageTracker;

/// Finished section: the text that enters the story plus its audit record.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionOutcome {
    pub final_text: String,
    pub record: DebateRecord,
}

/// Runs the three-role debate for a single outline entry.
///
/// Each role gets its own independently built prompt; no role sees another
/// role's raw request, only the rendered text it produced.
pub struct DebateOrchestrator<'a> {
    model: &'a dyn LanguageModel,
    settings: &'a GenerationSettings,
}

impl<'a> DebateOrchestrator<'a> {
    pub fn new(model: &'a dyn LanguageModel, settings: &'a GenerationSettings) -> Self {
        Self { model, settings }
    }

    async fn call(
        &self,
        role: AgentRole,
        prompt: String,
        usage: &mut UsageTracker,
    ) -> StoryResult<String> {
        complete_text(self.model, self.settings, role, prompt, usage).await
    }

    /// First draft, written with the full prior-section context.
    pub async fn run_affirmative(
        &self,
        spec: &SectionSpec,
        context: &[String],
        prompt_text: &str,
        usage: &mut UsageTracker,
    ) -> StoryResult<String> {
        info!(section = spec.index, "Affirmative Writer: drafting section");
        self.call(
            AgentRole::AffirmativeWriter,
            prompts::affirmative_prompt(spec, context, prompt_text),
            usage,
        )
        .await
    }

    /// Competing version written after reading the affirmative draft.
    pub async fn run_negative(
        &self,
        spec: &SectionSpec,
        affirmative_draft: &str,
        context: &[String],
        prompt_text: &str,
        usage: &mut UsageTracker,
    ) -> StoryResult<String> {
        info!(section = spec.index, "Negative Critic: reviewing and rewriting section");
        self.call(
            AgentRole::NegativeCritic,
            prompts::negative_prompt(spec, affirmative_draft, context, prompt_text),
            usage,
        )
        .await
    }

    /// Structured verdict over both drafts.
    pub async fn run_judge(
        &self,
        spec: &SectionSpec,
        affirmative_draft: &str,
        negative_draft: &str,
        usage: &mut UsageTracker,
    ) -> StoryResult<JudgeDecision> {
        info!(section = spec.index, "Judge/Editor: evaluating section");
        let raw = self
            .call(
                AgentRole::JudgeEditor,
                prompts::judge_prompt(spec, affirmative_draft, negative_draft),
                usage,
            )
            .await?;

        let decision: JudgeDecision = decode_json(&raw).map_err(|e| {
            warn!(section = spec.index, error = %e, raw = %raw, "Error parsing judge response");
            match e {
                DecodeError::Empty => StoryError::EmptyResponse {
                    role: AgentRole::JudgeEditor,
                },
                DecodeError::Json(reason) => StoryError::JudgeParse { reason },
            }
        })?;

        if decision.final_section.trim().is_empty() {
            warn!(section = spec.index, "Judge returned an empty final_section");
            return Err(StoryError::JudgeParse {
                reason: "final_section is empty".to_string(),
            });
        }

        Ok(decision)
    }

    /// Run the whole debate for `spec`.
    ///
    /// Fails only when the affirmative draft cannot be produced.
    pub async fn run(
        &self,
        spec: &SectionSpec,
        context: &[String],
        prompt_text: &str,
        usage: &mut UsageTracker,
    ) -> StoryResult<SectionOutcome> {
        info!(section = spec.index, title = %spec.title, "Debate for section");
        let mut session = DebateSession::new(spec.index);
        advance(&mut session, DebatePhase::Affirmative, "debate started");

        let affirmative = match self.run_affirmative(spec, context, prompt_text, usage).await {
            Ok(draft) => draft,
            Err(e) => {
                advance(&mut session, DebatePhase::Failed, &e.to_string());
                warn!(section = spec.index, "Failed to generate affirmative draft");
                return Err(StoryError::AffirmativeFailed {
                    section: spec.index,
                    reason: e.to_string(),
                });
            }
        };
        advance(&mut session, DebatePhase::Negative, "affirmative draft ready");

        let negative = match self
            .run_negative(spec, &affirmative, context, prompt_text, usage)
            .await
        {
            Ok(draft) => draft,
            Err(e) => {
                warn!(section = spec.index, error = %e, "Failed to generate negative draft, using affirmative");
                advance(&mut session, DebatePhase::Done, "negative failed: affirmative fallback");
                return Ok(fallback(spec, affirmative, None, FallbackReason::NegativeFailed, session));
            }
        };
        advance(&mut session, DebatePhase::Judge, "negative draft ready");

        match self.run_judge(spec, &affirmative, &negative, usage).await {
            Ok(decision) => {
                info!(
                    section = spec.index,
                    preferred = %decision.preferred_version,
                    reasoning = %decision.reasoning,
                    "Judge decision"
                );
                advance(&mut session, DebatePhase::Done, "judge decided");
                let final_text = decision.final_section.clone();
                let record = DebateRecord {
                    section_index: spec.index,
                    title: spec.title.clone(),
                    affirmative_draft: affirmative,
                    negative_draft: Some(negative),
                    judge_decision: Some(decision),
                    final_section: final_text.clone(),
                    degraded: false,
                    fallback: None,
                    transitions: session.transitions,
                };
                Ok(SectionOutcome { final_text, record })
            }
            Err(e) => {
                warn!(section = spec.index, error = %e, "Failed to get judge decision, using affirmative");
                advance(&mut session, DebatePhase::Done, "judge failed: affirmative fallback");
                Ok(fallback(
                    spec,
                    affirmative,
                    Some(negative),
                    FallbackReason::JudgeFailed,
                    session,
                ))
            }
        }
    }
}

/// Apply a transition along the fixed debate path. The path never requests
/// an illegal edge; if it somehow does, the phase is left unchanged and the
/// mismatch is logged.
fn advance(session: &mut DebateSession, to: DebatePhase, reason: &str) {
    match session.transition(to, reason) {
        Ok(()) if session.is_complete() => info!("{}", session.status_line()),
        Ok(()) => {}
        Err(e) => {
            tracing::error!(section = session.section, error = %e, "debate transition rejected")
        }
    }
}

fn fallback(
    spec: &SectionSpec,
    affirmative: String,
    negative: Option<String>,
    reason: FallbackReason,
    session: DebateSession,
) -> SectionOutcome {
    let record = DebateRecord {
        section_index: spec.index,
        title: spec.title.clone(),
        affirmative_draft: affirmative.clone(),
        negative_draft: negative,
        judge_decision: None,
        final_section: affirmative.clone(),
        degraded: true,
        fallback: Some(reason),
        transitions: session.transitions,
    };
    SectionOutcome {
        final_text: affirmative,
        record,
    }
}
