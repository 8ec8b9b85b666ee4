//! Prompt templates for each agent role.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever template content
//! changes, so a debate log can be traced back to the prompts that made it.

use crate::context::render_previous_sections;
use crate::outline::SectionSpec;

/// Prompt version. Bump on any template change.
pub const PROMPT_VERSION: &str = "1.3.0";

/// Outline request listing `section_count` stubs the model has to fill in.
pub fn outline_prompt(story_prompt: &str, section_count: u32) -> String {
    let stubs = (1..=section_count)
        .map(|n| {
            format!(
                "        {{\n            \"section\": {n},\n            \"title\": \"Section title in Japanese\",\n            \"summary\": \"Brief summary of what happens in this section\"\n        }}"
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "You are a skilled Japanese storywriter. Based on the story prompt below, create a detailed \
{section_count}-point outline of the story events in JSON format.

Story Prompt:
{story_prompt}

Please provide your response in the following JSON format:
{{
    \"title\": \"Story Title in Japanese\",
    \"outline\": [
{stubs}
    ]
}}

Respond ONLY with valid JSON. Do not include any other text."
    )
}

/// First-draft request for the affirmative writer.
pub fn affirmative_prompt(spec: &SectionSpec, context: &[String], story_prompt: &str) -> String {
    let previous = render_previous_sections(context);
    format!(
        "You are a skilled Japanese storywriter acting as the AFFIRMATIVE WRITER. Your role is to \
write the initial draft of a story section.

Original Story Prompt:
{story_prompt}

Section to write:
Title: {title}
Summary: {summary}
{previous}

Write Section {index} as a complete chapter in Japanese. Focus on:
- Engaging narrative flow
- Rich character development
- Beautiful prose and literary style
- Consistency with previous sections
- Advancing the story according to the outline

Write in an immersive, literary Japanese style that draws readers in.",
        title = spec.title,
        summary = spec.summary,
        index = spec.index,
    )
}

/// Critique-and-rewrite request for the negative critic.
pub fn negative_prompt(
    spec: &SectionSpec,
    affirmative_draft: &str,
    context: &[String],
    story_prompt: &str,
) -> String {
    let previous = render_previous_sections(context);
    format!(
        "You are a skilled Japanese storywriter acting as the NEGATIVE CRITIC. You have read the \
affirmative writer's draft and believe it can be significantly improved.

Original Story Prompt:
{story_prompt}

Section Requirements:
Title: {title}
Summary: {summary}
{previous}

AFFIRMATIVE WRITER'S DRAFT:
{affirmative_draft}

As the negative critic, you believe this draft has issues that need addressing. Provide your \
critique and write an improved alternative version that addresses these problems. Focus on:
- Better narrative pacing and tension
- Deeper character emotions and motivations
- More vivid and evocative descriptions
- Stronger dialogue and character interactions
- Better integration with the overall story arc

Write your improved version of Section {index} in Japanese.",
        title = spec.title,
        summary = spec.summary,
        index = spec.index,
    )
}

/// Adjudication request. The judge sees both drafts but not prior sections.
pub fn judge_prompt(spec: &SectionSpec, affirmative_draft: &str, negative_draft: &str) -> String {
    format!(
        "You are acting as both a LITERARY EDITOR and JUDGE. Two writers have provided different \
versions of Section {index} titled \"{title}\". Your role is to evaluate both versions and select \
the superior one, or create a refined version based on the best elements of both.

Section Requirements:
Title: {title}
Summary: {summary}

AFFIRMATIVE VERSION:
{affirmative_draft}

NEGATIVE VERSION:
{negative_draft}

Evaluate both versions based on:
1. Narrative flow and pacing
2. Character development and emotional depth
3. Prose quality and literary style
4. Consistency with story requirements
5. Reader engagement and immersion

Select the superior version OR create a refined version that combines the best elements. Return \
your decision in this JSON format:
{{
    \"preferred_version\": \"affirmative\" or \"negative\" or \"refined\",
    \"reasoning\": \"Detailed explanation of your choice and what makes it superior\",
    \"final_section\": \"The complete final version of the section in Japanese\"
}}

Respond ONLY with valid JSON.",
        title = spec.title,
        summary = spec.summary,
        index = spec.index,
    )
}

/// Single-call section request used in outlined mode.
pub fn section_prompt(spec: &SectionSpec, context: &[String], story_prompt: &str) -> String {
    let previous = render_previous_sections(context);
    format!(
        "You are a skilled Japanese storywriter. Write Section {index} of the story in Japanese.

Original Story Prompt:
{story_prompt}

Section to write:
Title: {title}
Summary: {summary}
{previous}

Write this section as a complete chapter in Japanese. Make sure it flows naturally from the \
previous sections and advances the story according to the outline. Write in an engaging, \
literary style.",
        title = spec.title,
        summary = spec.summary,
        index = spec.index,
    )
}

/// Whole-story request used in basic mode.
pub fn basic_story_prompt(story_prompt: &str) -> String {
    format!(
        "You are a skilled Japanese storywriter. Write a chapter of a story in Japanese according \
to the below summary and characters.

{story_prompt}"
    )
}
