use serde::{Deserialize, Serialize};

/// One ranked row of the month-to-date leaderboard. Derived on every call;
/// there is no persisted snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub joined_at: String,
    pub score: i64,
    pub rank: i64,
}
