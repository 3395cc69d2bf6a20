use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRecord {
    pub id: String,
    pub user_id: String,
    pub habit_id: String,
    pub completion_date: String,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: String,
}

/// Write shape used by the completion-toggle collaborator. Keyed by
/// (user, habit, day); flips or creates the flag for that day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionUpsert {
    pub user_id: String,
    pub habit_id: String,
    pub completion_date: String,
    pub completed: bool,
    #[serde(default)]
    pub notes: Option<String>,
}
