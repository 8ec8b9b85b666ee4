//! Token usage accounting — global and per-role totals for one run.
//!
//! A [`UsageTracker`] is owned by a single pipeline run and handed to each
//! step by `&mut`, so separate runs never share counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::llm::{AgentRole, TokenUsage};

/// Accumulated counts for one bucket (global or a single role).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub calls: u64,
}

impl RoleUsage {
    fn add(&mut self, usage: &TokenUsage) {
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.total_tokens += usage.total_tokens;
        self.calls += 1;
    }
}

/// Per-token prices used for the rough cost estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostRates {
    /// USD per prompt token.
    pub prompt: f64,
    /// USD per completion token.
    pub completion: f64,
}

impl Default for CostRates {
    fn default() -> Self {
        Self {
            prompt: 0.000_01,
            completion: 0.000_03,
        }
    }
}

/// Snapshot of everything recorded so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageTotals {
    pub global: RoleUsage,
    pub by_role: BTreeMap<AgentRole, RoleUsage>,
}

impl Default for UsageTotals {
    fn default() -> Self {
        Self {
            global: RoleUsage::default(),
            by_role: AgentRole::ALL
                .iter()
                .map(|role| (*role, RoleUsage::default()))
                .collect(),
        }
    }
}

impl UsageTotals {
    /// Totals for a single role (zero if never recorded).
    pub fn role(&self, role: AgentRole) -> RoleUsage {
        self.by_role.get(&role).copied().unwrap_or_default()
    }

    /// Roles that made at least one counted call, in pipeline order.
    pub fn active_roles(&self) -> impl Iterator<Item = (AgentRole, RoleUsage)> + '_ {
        self.by_role
            .iter()
            .filter(|(_, usage)| usage.calls > 0)
            .map(|(role, usage)| (*role, *usage))
    }

    /// Approximate spend in USD.
    pub fn estimated_cost(&self, rates: &CostRates) -> f64 {
        self.global.prompt_tokens as f64 * rates.prompt
            + self.global.completion_tokens as f64 * rates.completion
    }
}

/// Increment-only usage counters.
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    totals: UsageTotals,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call. Calls without usage metadata are skipped entirely.
    pub fn record(&mut self, role: AgentRole, usage: Option<TokenUsage>) {
        let Some(usage) = usage else {
            tracing::debug!(role = %role, "call reported no usage metadata");
            return;
        };

        self.totals.global.add(&usage);
        self.totals.by_role.entry(role).or_default().add(&usage);

        tracing::info!(
            role = %role,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            total_tokens = usage.total_tokens,
            "Tokens used"
        );
    }

    pub fn snapshot(&self) -> UsageTotals {
        self.totals.clone()
    }

    /// Counted calls so far.
    pub fn calls(&self) -> u64 {
        self.totals.global.calls
    }
}
