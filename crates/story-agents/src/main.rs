use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use story_agents::report::{failure_report, run_report};
use story_agents::{generate, OpenAiCompatClient, Overrides, RunOutcome, StoryConfig};
use story_coordination::{GenerationMode, LanguageModel};
use tracing::info;

/// Generate a long-form story from a prompt file through outline and
/// per-section debate.
#[derive(Debug, Parser)]
#[command(name = "story-agents", version)]
struct Args {
    /// TOML config file layered under environment and flags.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Prompt file (default: story_prompt.txt).
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Directory for the story and JSON logs.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// debate | outlined | basic
    #[arg(long)]
    mode: Option<GenerationMode>,

    /// Number of outline sections.
    #[arg(long)]
    sections: Option<u32>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    temperature: Option<f32>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            prompt_file: self.prompt_file.clone(),
            output_dir: self.output_dir.clone(),
            mode: self.mode,
            sections: self.sections,
            model: self.model.clone(),
            temperature: self.temperature,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = StoryConfig::load(args.config.as_deref())?;
    config.apply_overrides(args.overrides());
    config.validate().context("Invalid configuration")?;

    let client = OpenAiCompatClient::from_config(&config)?;
    info!(
        url = client.url(),
        model = client.model_name(),
        mode = %config.generation.mode,
        sections = config.generation.section_count,
        "Story generator starting"
    );

    match generate(&config, &client).await? {
        RunOutcome::Finished(run) => {
            println!("{}", run_report(&run, &config.cost));
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Failed(failure) => {
            eprintln!("{}", failure_report(&failure, &config.cost));
            Ok(ExitCode::FAILURE)
        }
    }
}
