//! Prompt input and run artifacts on disk.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use story_coordination::{
    DebateLog, GenerationMode, Outline, PipelineObserver, SectionSpec, StoppedAt, StoryDocument,
    UsageTotals,
};
use tracing::{info, warn};

pub const OUTLINE_FILE: &str = "story_outline.json";
pub const DEBATE_LOG_FILE: &str = "debate_log.json";
pub const USAGE_LOG_FILE: &str = "token_usage_log.json";

/// Story file name for a generation mode.
pub fn story_file_name(mode: GenerationMode) -> &'static str {
    match mode {
        GenerationMode::Debate => "generated_debate_story.txt",
        GenerationMode::Outlined => "generated_outlined_story.txt",
        GenerationMode::Basic => "generated_story.txt",
    }
}

/// Read and trim the story prompt. A missing file yields an empty prompt
/// (the pipeline rejects it); any other IO error is returned.
pub fn read_prompt(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(raw.trim().to_string()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Prompt file not found");
            Ok(String::new())
        }
        Err(e) => {
            Err(e).with_context(|| format!("Failed to read prompt file {}", path.display()))
        }
    }
}

/// Writes artifacts into one output directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn write_outline(&self, outline: &Outline) -> Result<PathBuf> {
        self.write_json(OUTLINE_FILE, outline)
    }

    pub fn write_debate_log(&self, log: &DebateLog) -> Result<PathBuf> {
        self.write_json(DEBATE_LOG_FILE, log)
    }

    pub fn write_usage(&self, usage: &UsageTotals) -> Result<PathBuf> {
        self.write_json(USAGE_LOG_FILE, usage)
    }

    /// Basic-mode stories are saved as the raw model text; the others get
    /// title and section headings.
    pub fn write_story(&self, story: &StoryDocument, mode: GenerationMode) -> Result<PathBuf> {
        let contents = match mode {
            GenerationMode::Basic => story.body(),
            GenerationMode::Debate | GenerationMode::Outlined => story.render(),
        };
        self.write_text(story_file_name(mode), &contents)
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize {file_name}"))?;
        self.write_text(file_name, &json)
    }

    fn write_text(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create output dir {}", self.dir.display()))?;
        let path = self.path(file_name);
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "Saved");
        Ok(path)
    }
}

/// Persists the outline the moment it exists, so it survives a run that
/// stops on its first section.
pub struct ArtifactObserver<'a> {
    writer: &'a ArtifactWriter,
    outline_written: bool,
}

impl<'a> ArtifactObserver<'a> {
    pub fn new(writer: &'a ArtifactWriter) -> Self {
        Self {
            writer,
            outline_written: false,
        }
    }

    pub fn outline_written(&self) -> bool {
        self.outline_written
    }
}

impl PipelineObserver for ArtifactObserver<'_> {
    fn on_outline(&mut self, outline: &Outline) {
        match self.writer.write_outline(outline) {
            Ok(_) => self.outline_written = true,
            Err(e) => warn!(error = %e, "Failed to save outline"),
        }
    }

    fn on_section(&mut self, spec: &SectionSpec, final_text: &str) {
        info!(
            section = spec.index,
            chars = final_text.chars().count(),
            "Section finalized"
        );
    }

    fn on_stopped(&mut self, stop: &StoppedAt) {
        warn!(section = stop.section, kind = %stop.error.kind(), "Run stopped early");
    }
}
