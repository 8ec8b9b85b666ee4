//! Pipeline driver — outline, then every section in order, then assembly.
//!
//! Strictly sequential: each call's output feeds the next, so there is never
//! more than one request in flight. A run owns its tracker, context and log.

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::context::ContextAccumulator;
use crate::debate::{DebateLog, DebateOrchestrator, DebateRecord, SectionOutcome};
use crate::error::{StoryError, StoryResult};
use crate::llm::{complete_text, AgentRole, LanguageModel};
use crate::outline::{Outline, OutlineGenerator, SectionSpec};
use crate::prompts;
use crate::settings::{GenerationMode, GenerationSettings};
use crate::story::{StoryAssembler, StoryDocument};
use crate::usage::{UsageTotals, UsageTracker};

/// Where and why a run stopped before the end of the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoppedAt {
    /// 1-based outline index of the section that failed.
    pub section: u32,
    pub error: StoryError,
}

/// A run that produced at least one section.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub mode: GenerationMode,
    /// `None` in basic mode.
    pub outline: Option<Outline>,
    pub story: StoryDocument,
    /// Empty outside debate mode.
    pub debate_log: DebateLog,
    pub usage: UsageTotals,
    pub stopped_at: Option<StoppedAt>,
}

impl PipelineRun {
    pub fn sections_completed(&self) -> usize {
        self.story.len()
    }

    /// Outline length, or the single piece written in basic mode.
    pub fn sections_total(&self) -> usize {
        self.outline
            .as_ref()
            .map_or(self.story.len(), Outline::len)
    }

    /// Whether every outline entry produced a section.
    pub fn is_complete(&self) -> bool {
        self.stopped_at.is_none()
    }

    /// Compact summary line.
    pub fn summary_line(&self) -> String {
        let status = match &self.stopped_at {
            None => "COMPLETE".to_string(),
            Some(stop) => format!("STOPPED at section {} ({})", stop.section, stop.error.kind()),
        };
        format!(
            "[{}] {}/{} sections | {} degraded | {} calls | run={}",
            status,
            self.sections_completed(),
            self.sections_total(),
            self.debate_log.degraded_count(),
            self.usage.global.calls,
            self.run_id
        )
    }
}

/// A run that produced no story. Carries whatever was already known so the
/// caller can still persist the outline and usage.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct PipelineFailure {
    pub run_id: Uuid,
    pub error: StoryError,
    pub outline: Option<Outline>,
    pub usage: UsageTotals,
}

/// Progress hooks, called synchronously as the run advances.
pub trait PipelineObserver {
    fn on_outline(&mut self, _outline: &Outline) {}

    fn on_section(&mut self, _spec: &SectionSpec, _final_text: &str) {}

    fn on_stopped(&mut self, _stop: &StoppedAt) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Top-level sequential loop.
pub struct PipelineDriver<'a> {
    model: &'a dyn LanguageModel,
    settings: &'a GenerationSettings,
}

impl<'a> PipelineDriver<'a> {
    pub fn new(model: &'a dyn LanguageModel, settings: &'a GenerationSettings) -> Self {
        Self { model, settings }
    }

    /// Run the pipeline without progress hooks.
    pub async fn run(&self, prompt_text: &str) -> Result<PipelineRun, PipelineFailure> {
        self.run_with_observer(prompt_text, &mut NoopObserver).await
    }

    pub async fn run_with_observer(
        &self,
        prompt_text: &str,
        observer: &mut dyn PipelineObserver,
    ) -> Result<PipelineRun, PipelineFailure> {
        let run_id = Uuid::new_v4();
        let mut usage = UsageTracker::new();
        info!(%run_id, mode = %self.settings.mode, model = self.model.model_name(), "Story pipeline starting");

        let failure = |error: StoryError, outline: Option<Outline>, usage: &UsageTracker| {
            PipelineFailure {
                run_id,
                error,
                outline,
                usage: usage.snapshot(),
            }
        };

        let prompt_text = prompt_text.trim();
        if prompt_text.is_empty() {
            return Err(failure(StoryError::EmptyPrompt, None, &usage));
        }

        if self.settings.mode == GenerationMode::Basic {
            info!(%run_id, "Generating story in a single call");
            let text = match complete_text(
                self.model,
                self.settings,
                AgentRole::StoryWriter,
                prompts::basic_story_prompt(prompt_text),
                &mut usage,
            )
            .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!(%run_id, error = %e, "Failed to generate story");
                    return Err(failure(e, None, &usage));
                }
            };
            let run = PipelineRun {
                run_id,
                mode: self.settings.mode,
                outline: None,
                story: StoryAssembler::single(text),
                debate_log: DebateLog::new(),
                usage: usage.snapshot(),
                stopped_at: None,
            };
            info!("{}", run.summary_line());
            return Ok(run);
        }

        let outline = match OutlineGenerator::new(self.model, self.settings)
            .generate(prompt_text, &mut usage)
            .await
        {
            Ok(outline) => outline,
            Err(e) => {
                warn!(%run_id, error = %e, "Failed to generate story outline");
                return Err(failure(e, None, &usage));
            }
        };
        observer.on_outline(&outline);

        let mut context = ContextAccumulator::new();
        let mut debate_log = DebateLog::new();
        let mut stopped_at = None;

        for spec in &outline.sections {
            let written = self
                .write_section(spec, context.snapshot(), prompt_text, &mut usage)
                .await;
            match written {
                Ok(outcome) => {
                    observer.on_section(spec, &outcome.final_text);
                    if let Some(record) = outcome.record {
                        debate_log.push(record);
                    }
                    context.append(outcome.final_text);
                    info!(
                        section = spec.index,
                        completed = context.len(),
                        total = outline.len(),
                        "Section completed"
                    );
                }
                Err(error) => {
                    warn!(section = spec.index, error = %error, "Failed to generate section, stopping");
                    let stop = StoppedAt {
                        section: spec.index,
                        error,
                    };
                    observer.on_stopped(&stop);
                    stopped_at = Some(stop);
                    break;
                }
            }
        }

        if context.is_empty() {
            let section = stopped_at.as_ref().map(|s| s.section).unwrap_or(1);
            return Err(failure(
                StoryError::NoSectionsGenerated { section },
                Some(outline),
                &usage,
            ));
        }

        let story = StoryAssembler::assemble(&outline, context.snapshot());
        let run = PipelineRun {
            run_id,
            mode: self.settings.mode,
            outline: Some(outline),
            story,
            debate_log,
            usage: usage.snapshot(),
            stopped_at,
        };
        info!("{}", run.summary_line());
        Ok(run)
    }

    async fn write_section(
        &self,
        spec: &SectionSpec,
        context: &[String],
        prompt_text: &str,
        usage: &mut UsageTracker,
    ) -> StoryResult<WrittenSection> {
        match self.settings.mode {
            GenerationMode::Debate => {
                let SectionOutcome { final_text, record } =
                    DebateOrchestrator::new(self.model, self.settings)
                        .run(spec, context, prompt_text, usage)
                        .await?;
                Ok(WrittenSection {
                    final_text,
                    record: Some(record),
                })
            }
            GenerationMode::Outlined | GenerationMode::Basic => {
                info!(section = spec.index, title = %spec.title, "Generating section");
                let final_text = complete_text(
                    self.model,
                    self.settings,
                    AgentRole::SectionWriter,
                    prompts::section_prompt(spec, context, prompt_text),
                    usage,
                )
                .await?;
                Ok(WrittenSection {
                    final_text,
                    record: None,
                })
            }
        }
    }
}

struct WrittenSection {
    final_text: String,
    record: Option<DebateRecord>,
}
