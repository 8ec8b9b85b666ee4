//! Mocked pipeline integration test — exercises outline → debate → assembly
//! with a deterministic scripted model (no LLM calls).
//!
//! Covers: outline generator ↔ debate orchestrator ↔ context accumulator ↔
//! usage tracker ↔ story assembler running together in a single pass.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use story_coordination::{
    AgentRole, Completion, CompletionRequest, FallbackReason, GenerationMode, GenerationSettings,
    LanguageModel, LlmError, Outline, PipelineDriver, PipelineObserver, SectionSpec, StoppedAt,
    StoryError, TokenUsage,
};

/// What the scripted model should do for one call.
#[derive(Clone, Copy)]
enum Reply {
    Normal,
    Empty,
    Error,
    NotJson,
}

/// Scripted model: replies per role, numbering calls per role so the nth
/// affirmative call belongs to section n.
struct StoryScript {
    overrides: HashMap<(AgentRole, u32), Reply>,
    counters: Mutex<HashMap<AgentRole, u32>>,
    requests: Mutex<Vec<CompletionRequest>>,
    outline_sections: u32,
}

impl StoryScript {
    fn new(outline_sections: u32) -> Self {
        Self {
            overrides: HashMap::new(),
            counters: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            outline_sections,
        }
    }

    fn with(mut self, role: AgentRole, nth: u32, reply: Reply) -> Self {
        self.overrides.insert((role, nth), reply);
        self
    }

    fn prompts_for(&self, role: AgentRole) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.role == role)
            .map(|r| r.prompt.clone())
            .collect()
    }

    fn outline_json(&self) -> String {
        let sections = (1..=self.outline_sections)
            .map(|n| {
                format!(
                    "{{\"section\": {n}, \"title\": \"第{n}章\", \"summary\": \"光を追う{n}\"}}"
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");
        format!("```json\n{{\"title\": \"森の不思議な光\", \"outline\": [\n{sections}\n]}}\n```")
    }

    fn normal_text(&self, role: AgentRole, nth: u32) -> String {
        match role {
            AgentRole::OutlineGenerator => self.outline_json(),
            AgentRole::AffirmativeWriter => format!("affirmative-{nth}"),
            AgentRole::NegativeCritic => format!("negative-{nth}"),
            AgentRole::JudgeEditor => format!(
                "{{\"preferred_version\": \"refined\", \"reasoning\": \"merged\", \"final_section\": \"final-{nth}\"}}"
            ),
            AgentRole::SectionWriter => format!("section-{nth}"),
            AgentRole::StoryWriter => "whole-story".to_string(),
        }
    }
}

#[async_trait]
impl LanguageModel for StoryScript {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        let role = request.role;
        self.requests.lock().unwrap().push(request);
        let nth = {
            let mut counters = self.counters.lock().unwrap();
            let counter = counters.entry(role).or_insert(0);
            *counter += 1;
            *counter
        };

        let usage = Some(TokenUsage::new(100, 50, 150));
        match self.overrides.get(&(role, nth)).copied().unwrap_or(Reply::Normal) {
            Reply::Normal => Ok(Completion {
                text: self.normal_text(role, nth),
                usage,
            }),
            Reply::Empty => Ok(Completion {
                text: String::new(),
                usage,
            }),
            Reply::Error => Err(LlmError::Request("503 Service Unavailable".to_string())),
            Reply::NotJson => Ok(Completion {
                text: "Version B is clearly stronger.".to_string(),
                usage,
            }),
        }
    }

    fn model_name(&self) -> &str {
        "story-script"
    }
}

const PROMPT: &str = "少年が森で不思議な光を見つける";

// ── Happy path: all roles succeed ─────────────────────────────────

#[tokio::test]
async fn test_full_debate_run() {
    let model = StoryScript::new(6);
    let settings = GenerationSettings::default();

    let run = PipelineDriver::new(&model, &settings).run(PROMPT).await.unwrap();

    assert!(run.is_complete());
    assert_eq!(run.outline.as_ref().unwrap().title, "森の不思議な光");
    assert_eq!(run.story.len(), 6);
    assert_eq!(run.debate_log.len(), 6);
    assert!(run
        .debate_log
        .records()
        .iter()
        .all(|r| r.judge_decision.is_some() && !r.degraded));
    assert_eq!(run.story.sections[5].text, "final-6");
    assert_eq!(run.story.sections[5].title, "第6章");

    // 1 outline + 6 × 3 debate calls
    assert_eq!(run.usage.global.calls, 19);
    assert_eq!(run.usage.role(AgentRole::AffirmativeWriter).calls, 6);
    assert_eq!(run.usage.role(AgentRole::SectionWriter).calls, 0);
    assert!(run.summary_line().contains("[COMPLETE] 6/6 sections"));
}

// ── Affirmative failure stops the run ─────────────────────────────

#[tokio::test]
async fn test_affirmative_failure_at_section_three() {
    let model = StoryScript::new(6).with(AgentRole::AffirmativeWriter, 3, Reply::Error);
    let settings = GenerationSettings::default();

    let run = PipelineDriver::new(&model, &settings).run(PROMPT).await.unwrap();

    assert!(!run.is_complete());
    assert_eq!(run.story.len(), 2);
    assert_eq!(run.debate_log.len(), 2);
    let stop = run.stopped_at.as_ref().unwrap();
    assert_eq!(stop.section, 3);
    assert!(matches!(stop.error, StoryError::AffirmativeFailed { section: 3, .. }));
    // nothing after the failed affirmative call
    assert_eq!(model.prompts_for(AgentRole::AffirmativeWriter).len(), 3);
    assert_eq!(model.prompts_for(AgentRole::NegativeCritic).len(), 2);
    assert!(run.story.render().ends_with("## 第2章\n\nfinal-2"));
    assert!(run.summary_line().contains("STOPPED at section 3 (affirmative_failed)"));
}

#[tokio::test]
async fn test_first_section_failure_generates_nothing() {
    let model = StoryScript::new(6).with(AgentRole::AffirmativeWriter, 1, Reply::Empty);
    let settings = GenerationSettings::default();

    let failure = PipelineDriver::new(&model, &settings)
        .run(PROMPT)
        .await
        .unwrap_err();

    assert_eq!(failure.error, StoryError::NoSectionsGenerated { section: 1 });
    assert!(failure.outline.is_some());
    // outline + empty affirmative both reported usage
    assert_eq!(failure.usage.global.calls, 2);
}

// ── Fallback paths ────────────────────────────────────────────────

#[tokio::test]
async fn test_judge_non_json_falls_back_and_feeds_context() {
    let model = StoryScript::new(6).with(AgentRole::JudgeEditor, 4, Reply::NotJson);
    let settings = GenerationSettings::default();

    let run = PipelineDriver::new(&model, &settings).run(PROMPT).await.unwrap();

    assert_eq!(run.story.len(), 6);
    let record = &run.debate_log.records()[3];
    assert_eq!(record.section_index, 4);
    assert!(record.judge_decision.is_none());
    assert_eq!(record.final_section, "affirmative-4");
    assert_eq!(record.fallback, Some(FallbackReason::JudgeFailed));
    assert_eq!(run.debate_log.degraded_count(), 1);

    // section 5 saw the fallback text as context
    let fifth = &model.prompts_for(AgentRole::AffirmativeWriter)[4];
    assert!(fifth.contains("--- Section 4 ---\naffirmative-4\n"));
}

#[tokio::test]
async fn test_negative_failure_uses_affirmative_verbatim() {
    let model = StoryScript::new(6).with(AgentRole::NegativeCritic, 2, Reply::Empty);
    let settings = GenerationSettings::default();

    let run = PipelineDriver::new(&model, &settings).run(PROMPT).await.unwrap();

    let record = &run.debate_log.records()[1];
    assert_eq!(record.final_section, record.affirmative_draft);
    assert!(record.judge_decision.is_none());
    assert!(record.negative_draft.is_none());
    assert_eq!(record.fallback, Some(FallbackReason::NegativeFailed));
    assert_eq!(run.story.sections[1].text, "affirmative-2");
    // judge skipped for section 2 only
    assert_eq!(model.prompts_for(AgentRole::JudgeEditor).len(), 5);
}

// ── Context monotonicity ──────────────────────────────────────────

#[tokio::test]
async fn test_context_is_exactly_prior_sections() {
    let model = StoryScript::new(6);
    let settings = GenerationSettings::default();

    PipelineDriver::new(&model, &settings).run(PROMPT).await.unwrap();

    let affirmative = model.prompts_for(AgentRole::AffirmativeWriter);
    let negative = model.prompts_for(AgentRole::NegativeCritic);
    assert!(!affirmative[0].contains("Previous sections"));
    for k in 1..=6usize {
        for prompt in [&affirmative[k - 1], &negative[k - 1]] {
            for j in 1..k {
                assert!(prompt.contains(&format!("--- Section {j} ---\nfinal-{j}\n")));
            }
            assert!(!prompt.contains(&format!("--- Section {k} ---")));
        }
    }

    // ordered: section 1 appears before section 2 in the last prompt
    let last = &affirmative[5];
    assert!(last.find("--- Section 1 ---").unwrap() < last.find("--- Section 2 ---").unwrap());
}

// ── Outline failures ──────────────────────────────────────────────

#[tokio::test]
async fn test_outline_parse_failure_aborts() {
    let model = StoryScript::new(6).with(AgentRole::OutlineGenerator, 1, Reply::NotJson);
    let settings = GenerationSettings::default();

    let failure = PipelineDriver::new(&model, &settings)
        .run(PROMPT)
        .await
        .unwrap_err();

    assert!(matches!(failure.error, StoryError::OutlineParse { .. }));
    assert!(failure.outline.is_none());
    assert_eq!(model.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_outline_wrong_cardinality_aborts() {
    let model = StoryScript::new(5);
    let settings = GenerationSettings::default();

    let failure = PipelineDriver::new(&model, &settings)
        .run(PROMPT)
        .await
        .unwrap_err();
    assert!(matches!(failure.error, StoryError::OutlineInvalid { .. }));
}

#[tokio::test]
async fn test_outline_empty_response() {
    let model = StoryScript::new(6).with(AgentRole::OutlineGenerator, 1, Reply::Error);
    let settings = GenerationSettings::default();

    let failure = PipelineDriver::new(&model, &settings)
        .run(PROMPT)
        .await
        .unwrap_err();
    assert_eq!(
        failure.error,
        StoryError::EmptyResponse {
            role: AgentRole::OutlineGenerator
        }
    );
}

#[tokio::test]
async fn test_blank_prompt_makes_no_calls() {
    let model = StoryScript::new(6);
    let settings = GenerationSettings::default();

    let failure = PipelineDriver::new(&model, &settings)
        .run("  \n")
        .await
        .unwrap_err();
    assert_eq!(failure.error, StoryError::EmptyPrompt);
    assert!(model.requests.lock().unwrap().is_empty());
}

// ── Outlined mode ─────────────────────────────────────────────────

#[tokio::test]
async fn test_outlined_mode_single_call_per_section() {
    let model = StoryScript::new(3);
    let settings = GenerationSettings {
        section_count: 3,
        mode: GenerationMode::Outlined,
        ..Default::default()
    };

    let run = PipelineDriver::new(&model, &settings).run(PROMPT).await.unwrap();

    assert_eq!(run.story.len(), 3);
    assert!(run.debate_log.is_empty());
    assert_eq!(run.story.sections[2].text, "section-3");
    assert_eq!(run.usage.role(AgentRole::SectionWriter).calls, 3);
    assert_eq!(run.usage.role(AgentRole::JudgeEditor).calls, 0);
    let third = &model.prompts_for(AgentRole::SectionWriter)[2];
    assert!(third.contains("--- Section 2 ---\nsection-2\n"));
}

// ── Basic mode ────────────────────────────────────────────────────

#[tokio::test]
async fn test_basic_mode_one_call_no_outline() {
    let model = StoryScript::new(6);
    let settings = GenerationSettings {
        mode: GenerationMode::Basic,
        ..Default::default()
    };

    let run = PipelineDriver::new(&model, &settings).run(PROMPT).await.unwrap();

    assert!(run.outline.is_none());
    assert!(run.is_complete());
    assert_eq!(run.sections_total(), 1);
    assert_eq!(run.story.body(), "whole-story");
    assert!(run.debate_log.is_empty());
    assert_eq!(run.usage.global.calls, 1);
    assert_eq!(run.usage.role(AgentRole::StoryWriter).calls, 1);
    let prompts = model.prompts_for(AgentRole::StoryWriter);
    assert!(prompts[0].ends_with(PROMPT));
}

#[tokio::test]
async fn test_basic_mode_empty_response_fails() {
    let model = StoryScript::new(6).with(AgentRole::StoryWriter, 1, Reply::Empty);
    let settings = GenerationSettings {
        mode: GenerationMode::Basic,
        ..Default::default()
    };

    let failure = PipelineDriver::new(&model, &settings)
        .run(PROMPT)
        .await
        .unwrap_err();

    assert_eq!(
        failure.error,
        StoryError::EmptyResponse {
            role: AgentRole::StoryWriter
        }
    );
    assert!(failure.outline.is_none());
    assert_eq!(failure.usage.global.calls, 1);
}

// ── Usage additivity across a degraded run ────────────────────────

#[tokio::test]
async fn test_usage_global_equals_role_sum() {
    let model = StoryScript::new(6)
        .with(AgentRole::NegativeCritic, 1, Reply::Error)
        .with(AgentRole::JudgeEditor, 2, Reply::NotJson)
        .with(AgentRole::AffirmativeWriter, 5, Reply::Error);
    let settings = GenerationSettings::default();

    let run = PipelineDriver::new(&model, &settings).run(PROMPT).await.unwrap();

    let sum: u64 = run.usage.by_role.values().map(|u| u.total_tokens).sum();
    assert_eq!(run.usage.global.total_tokens, sum);
    assert_eq!(run.story.len(), run.debate_log.len());
    assert_eq!(run.story.len(), 4);
}

// ── Observer hooks ────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    outline: Option<Outline>,
    sections: Vec<u32>,
    stopped: Option<u32>,
}

impl PipelineObserver for Recorder {
    fn on_outline(&mut self, outline: &Outline) {
        self.outline = Some(outline.clone());
    }

    fn on_section(&mut self, spec: &SectionSpec, _final_text: &str) {
        self.sections.push(spec.index);
    }

    fn on_stopped(&mut self, stop: &StoppedAt) {
        self.stopped = Some(stop.section);
    }
}

#[tokio::test]
async fn test_observer_sees_progress() {
    let model = StoryScript::new(6).with(AgentRole::AffirmativeWriter, 4, Reply::Empty);
    let settings = GenerationSettings::default();
    let mut recorder = Recorder::default();

    PipelineDriver::new(&model, &settings)
        .run_with_observer(PROMPT, &mut recorder)
        .await
        .unwrap();

    assert_eq!(recorder.outline.unwrap().len(), 6);
    assert_eq!(recorder.sections, vec![1, 2, 3]);
    assert_eq!(recorder.stopped, Some(4));
}
