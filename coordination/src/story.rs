//! Story assembly — finalized sections under the outline title.

use serde::{Deserialize, Serialize};

use crate::outline::{Outline, DEFAULT_TITLE};

/// One rendered chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySection {
    pub title: String,
    pub text: String,
}

/// The finished (possibly partial) story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryDocument {
    pub title: String,
    pub sections: Vec<StorySection>,
}

impl StoryDocument {
    /// `# {title}` followed by `## {section}` blocks separated by blank lines.
    pub fn render(&self) -> String {
        let body = self
            .sections
            .iter()
            .map(|s| format!("## {}\n\n{}", s.title, s.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        format!("# {}\n\n{}", self.title, body)
    }

    /// Section texts only, without any headings.
    pub fn body(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Pairs finalized texts with outline titles, in outline order.
pub struct StoryAssembler;

impl StoryAssembler {
    /// Only as many sections as there are finalized texts are emitted, so a
    /// run that stopped early yields the completed prefix.
    pub fn assemble(outline: &Outline, finalized: &[String]) -> StoryDocument {
        let sections = outline
            .sections
            .iter()
            .zip(finalized)
            .map(|(spec, text)| StorySection {
                title: spec.title.clone(),
                text: text.clone(),
            })
            .collect();

        StoryDocument {
            title: outline.title.clone(),
            sections,
        }
    }

    /// A story written in one piece, with no outline behind it.
    pub fn single(text: impl Into<String>) -> StoryDocument {
        StoryDocument {
            title: DEFAULT_TITLE.to_string(),
            sections: vec![StorySection {
                title: DEFAULT_TITLE.to_string(),
                text: text.into(),
            }],
        }
    }
}
