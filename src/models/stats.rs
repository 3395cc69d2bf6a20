use serde::{Deserialize, Serialize};

use crate::models::score::DailyScoreRecord;

/// Rolling statistics over an inclusive date range. Derived fresh on every
/// request; never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreStats {
    pub total_score: i64,
    pub average_score: i64,
    pub average_percentage: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_day: Option<DailyScoreRecord>,
    pub current_streak: i64,
    pub longest_streak: i64,
    pub scores: Vec<DailyScoreRecord>,
}

/// Completion rate for one habit across a month, for the completion-rates
/// dashboard view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitCompletionRate {
    pub habit_id: String,
    pub name: String,
    pub color: String,
    pub completed_days: i64,
    pub total_days: i64,
    pub completion_rate: i64,
}

/// Completed days over calendar days for one habit in an arbitrary range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRateSummary {
    pub completed_days: i64,
    pub total_days: i64,
    pub rate: f64,
}
