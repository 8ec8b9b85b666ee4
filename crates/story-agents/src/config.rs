use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use story_coordination::{CostRates, GenerationMode, GenerationSettings};

/// Gemini's OpenAI-compatible surface.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai/";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_PROMPT_FILE: &str = "story_prompt.txt";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Chat-completions endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub model: String,
    /// Never written back out; normally supplied through the environment.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Sent as `reasoning_effort` when set. Gemini accepts "none" to
    /// disable thinking.
    pub reasoning_effort: Option<String>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            model: DEFAULT_MODEL.into(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            reasoning_effort: Some("none".into()),
        }
    }
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub prompt_file: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            prompt_file: PathBuf::from(DEFAULT_PROMPT_FILE),
            output_dir: PathBuf::from("."),
        }
    }
}

/// Top-level generator configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    pub endpoint: EndpointConfig,
    pub generation: GenerationSettings,
    pub paths: PathsConfig,
    pub cost: CostRates,
}

/// Command-line values that win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub prompt_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub mode: Option<GenerationMode>,
    pub sections: Option<u32>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

impl StoryConfig {
    /// Defaults (or the TOML file, when given), then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `STORY_*` / `GEMINI_API_KEY` overrides from `lookup`.
    ///
    /// `STORY_API_KEY` takes precedence over `GEMINI_API_KEY`. Empty values
    /// are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("STORY_BASE_URL") {
            self.endpoint.base_url = url;
        }
        if let Some(model) = get("STORY_MODEL") {
            self.endpoint.model = model;
        }
        if let Some(key) = get("STORY_API_KEY").or_else(|| get("GEMINI_API_KEY")) {
            self.endpoint.api_key = Some(key);
        }
        if let Some(raw) = get("STORY_TEMPERATURE") {
            self.generation.temperature = raw
                .trim()
                .parse()
                .with_context(|| format!("STORY_TEMPERATURE is not a number: {raw}"))?;
        }
        if let Some(raw) = get("STORY_SECTIONS") {
            self.generation.section_count = raw
                .trim()
                .parse()
                .with_context(|| format!("STORY_SECTIONS is not a count: {raw}"))?;
        }
        if let Some(raw) = get("STORY_TIMEOUT_SECS") {
            self.endpoint.timeout_secs = raw
                .trim()
                .parse()
                .with_context(|| format!("STORY_TIMEOUT_SECS is not a number: {raw}"))?;
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(path) = overrides.prompt_file {
            self.paths.prompt_file = path;
        }
        if let Some(dir) = overrides.output_dir {
            self.paths.output_dir = dir;
        }
        if let Some(mode) = overrides.mode {
            self.generation.mode = mode;
        }
        if let Some(sections) = overrides.sections {
            self.generation.section_count = sections;
        }
        if let Some(model) = overrides.model {
            self.endpoint.model = model;
        }
        if let Some(temperature) = overrides.temperature {
            self.generation.temperature = temperature;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.generation.section_count == 0 {
            bail!("section count must be at least 1");
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            bail!(
                "temperature must be within 0.0..=2.0, got {}",
                self.generation.temperature
            );
        }
        if self.endpoint.timeout_secs == 0 {
            bail!("timeout_secs must be positive");
        }
        if self.endpoint.base_url.trim().is_empty() {
            bail!("endpoint base_url is empty");
        }
        if self.api_key().is_none() {
            bail!("no API key configured (set STORY_API_KEY or GEMINI_API_KEY)");
        }
        Ok(())
    }

    pub fn api_key(&self) -> Option<&str> {
        self.endpoint
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}
