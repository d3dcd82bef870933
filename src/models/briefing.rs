use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{FlagCategory, FlagSource, Severity};

/// A single finding surfaced by the briefing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flag {
    pub category: FlagCategory,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub source: FlagSource,
    pub suggested_action: Option<String>,
}

/// One-line synopsis block at the top of the briefing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingSummary {
    pub one_liner: String,
    pub key_conditions: Vec<String>,
    pub relevant_history: String,
}

/// A recommended next step, ordered by ascending priority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub action: String,
    pub reason: String,
    pub priority: i32,
}

/// An AI-generated briefing, immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientBriefing {
    pub flags: Vec<Flag>,
    pub summary: BriefingSummary,
    pub suggested_actions: Vec<SuggestedAction>,
    pub generated_at: DateTime<Utc>,
}

impl PatientBriefing {
    /// Suggested actions in display order: ascending priority, ties
    /// keeping their original relative order (stable sort).
    pub fn sorted_actions(&self) -> Vec<&SuggestedAction> {
        let mut actions: Vec<&SuggestedAction> = self.suggested_actions.iter().collect();
        actions.sort_by_key(|a| a.priority);
        actions
    }
}
