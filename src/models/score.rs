use serde::{Deserialize, Serialize};

/// One derived score row per (user, calendar day). `score` and `percentage`
/// are always recomputed from the habit counts, never set directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyScoreRecord {
    pub user_id: String,
    pub score_date: String,
    pub total_habits: i64,
    pub completed_habits: i64,
    pub score: i64,
    pub percentage: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl DailyScoreRecord {
    /// A day counts toward streaks only when every active habit was done.
    pub fn is_perfect_day(&self) -> bool {
        (self.percentage - 100.0).abs() < f64::EPSILON
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyScoreUpsert {
    pub user_id: String,
    pub score_date: String,
    pub total_habits: i64,
    pub completed_habits: i64,
    pub score: i64,
    pub percentage: f64,
    /// Timestamp for this write; becomes created_at on insert, updated_at
    /// always.
    pub recorded_at: String,
}
