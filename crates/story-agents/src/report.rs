//! Human-readable end-of-run summaries.

use std::fmt::Write;
use story_coordination::{AgentRole, CostRates, PipelineFailure, PipelineRun, UsageTotals};

/// "affirmative_writer" → "Affirmative Writer".
pub fn role_label(role: AgentRole) -> String {
    role.as_str()
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Integer with comma thousands separators.
pub fn with_commas(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn usage_summary(usage: &UsageTotals, rates: &CostRates) -> String {
    let mut out = String::new();
    let g = &usage.global;
    let _ = writeln!(out, "=== Token Usage Summary ===");
    let _ = writeln!(out, "Total API calls: {}", g.calls);
    let _ = writeln!(
        out,
        "Total tokens: {} (prompt {} / completion {})",
        with_commas(g.total_tokens),
        with_commas(g.prompt_tokens),
        with_commas(g.completion_tokens)
    );
    let mut roles = usage.active_roles().peekable();
    if roles.peek().is_some() {
        let _ = writeln!(out, "By role:");
        for (role, u) in roles {
            let _ = writeln!(
                out,
                "  {}: {} calls, {} tokens",
                role_label(role),
                u.calls,
                with_commas(u.total_tokens)
            );
        }
    }
    let _ = write!(out, "Estimated cost: ${:.4}", usage.estimated_cost(rates));
    out
}

pub fn run_report(run: &PipelineRun, rates: &CostRates) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", run.summary_line());
    let _ = writeln!(
        out,
        "Story: \"{}\" ({} of {} sections)",
        run.story.title,
        run.sections_completed(),
        run.sections_total()
    );
    if let Some(stop) = &run.stopped_at {
        let _ = writeln!(out, "Stopped at section {}: {}", stop.section, stop.error);
    }
    out.push_str(&usage_summary(&run.usage, rates));
    out
}

pub fn failure_report(failure: &PipelineFailure, rates: &CostRates) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "[FAILED] {} ({}) | run={}",
        failure.error,
        failure.error.kind(),
        failure.run_id
    );
    if let Some(outline) = &failure.outline {
        let _ = writeln!(
            out,
            "Outline: \"{}\" ({} sections, none completed)",
            outline.title,
            outline.len()
        );
    }
    out.push_str(&usage_summary(&failure.usage, rates));
    out
}
