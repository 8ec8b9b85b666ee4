//! One generator run: read the prompt, drive the pipeline, persist artifacts.

use anyhow::Result;
use story_coordination::{
    GenerationMode, LanguageModel, PipelineDriver, PipelineFailure, PipelineRun,
};
use tracing::{info, warn};

use crate::artifacts::{read_prompt, ArtifactObserver, ArtifactWriter};
use crate::config::StoryConfig;

/// How a run ended. Artifact IO errors are reported separately as `Err`.
#[derive(Debug)]
pub enum RunOutcome {
    /// At least one section was written (possibly a partial story).
    Finished(PipelineRun),
    /// No story was produced.
    Failed(PipelineFailure),
}

impl RunOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

pub async fn generate(config: &StoryConfig, model: &dyn LanguageModel) -> Result<RunOutcome> {
    let prompt = read_prompt(&config.paths.prompt_file)?;
    if prompt.is_empty() {
        warn!(
            path = %config.paths.prompt_file.display(),
            "No story prompt found. Please add content to the prompt file"
        );
    } else {
        info!(chars = prompt.chars().count(), "Loaded story prompt");
    }

    let writer = ArtifactWriter::new(&config.paths.output_dir);
    info!(dir = %writer.dir().display(), mode = %config.generation.mode, "Writing artifacts");
    let mut observer = ArtifactObserver::new(&writer);
    let driver = PipelineDriver::new(model, &config.generation);

    match driver.run_with_observer(&prompt, &mut observer).await {
        Ok(run) => {
            // The observer only logs its write errors; retry so a failure
            // surfaces here instead of leaving the run without an outline.
            if let Some(outline) = &run.outline {
                if !observer.outline_written() {
                    writer.write_outline(outline)?;
                }
            }
            writer.write_story(&run.story, run.mode)?;
            if run.mode == GenerationMode::Debate {
                writer.write_debate_log(&run.debate_log)?;
            }
            writer.write_usage(&run.usage)?;
            if !run.is_complete() {
                warn!(
                    completed = run.sections_completed(),
                    total = run.sections_total(),
                    "Saved a partial story"
                );
            }
            Ok(RunOutcome::Finished(run))
        }
        Err(failure) => {
            if let Some(outline) = &failure.outline {
                if !observer.outline_written() {
                    writer.write_outline(outline)?;
                }
            }
            warn!(run_id = %failure.run_id, error = %failure.error, "Story generation failed");
            Ok(RunOutcome::Failed(failure))
        }
    }
}
