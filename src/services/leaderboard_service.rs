use std::sync::Arc;

use tracing::debug;

use crate::db::repositories::score_repository::ScoreRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::leaderboard::LeaderboardEntry;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::dates;

/// Ranks every user by summed score over the current calendar month.
/// Fully recomputed on each call; there is no persisted snapshot, so the
/// result always reflects the score store at call time.
pub struct LeaderboardService {
    db: DbPool,
    clock: Arc<dyn Clock>,
}

impl LeaderboardService {
    pub fn new(db: DbPool) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Global month-to-date ranking. Users with no score rows in the month
    /// appear with a zero total; equal totals order by user id so repeated
    /// calls over identical data rank identically.
    pub fn get_leaderboard(&self) -> AppResult<Vec<LeaderboardEntry>> {
        let today = self.clock.today();
        let (start, end) = dates::month_bounds(today);

        let conn = self.db.get_connection()?;
        let totals = ScoreRepository::sum_by_user_in_range(&conn, &start, &end)?;
        debug!(
            target: "app::leaderboard",
            month_start = %start,
            month_end = %end,
            users = totals.len(),
            "leaderboard recomputed"
        );

        let entries = totals
            .into_iter()
            .enumerate()
            .map(|(index, row)| LeaderboardEntry {
                user_id: row.user_id,
                username: row.username,
                email: row.email,
                joined_at: row.joined_at,
                score: row.total_score,
                rank: index as i64 + 1,
            })
            .collect();

        Ok(entries)
    }
}
