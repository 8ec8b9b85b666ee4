//! Outer layer of the debate story generator: configuration, the
//! OpenAI-compatible client, artifact IO and run reports. The pipeline
//! itself lives in `story_coordination`.

pub mod artifacts;
pub mod client;
pub mod config;
pub mod report;
pub mod runner;

pub use client::OpenAiCompatClient;
pub use config::{Overrides, StoryConfig};
pub use runner::{generate, RunOutcome};
