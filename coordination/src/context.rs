//! Narrative context — finalized section texts, in completion order.
//!
//! Every later call sees the full list verbatim. Nothing is deduplicated or
//! truncated here; context-length limits belong to the model provider.

/// Append-only list of finalized sections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextAccumulator {
    sections: Vec<String>,
}

impl ContextAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, final_text: impl Into<String>) {
        self.sections.push(final_text.into());
    }

    /// Ordered view of everything appended so far.
    pub fn snapshot(&self) -> &[String] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Render prior sections as the prompt block writers and critics receive.
/// Empty when there is nothing before the current section.
pub fn render_previous_sections(sections: &[String]) -> String {
    if sections.is_empty() {
        return String::new();
    }

    let mut out = String::from("\n\nPrevious sections of the story:\n");
    for (i, text) in sections.iter().enumerate() {
        out.push_str(&format!("\n--- Section {} ---\n{}\n", i + 1, text));
    }
    out
}
