use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::db::repositories::completion_repository::CompletionRepository;
use crate::db::repositories::habit_repository::HabitRepository;
use crate::db::repositories::score_repository::ScoreRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::score::{DailyScoreRecord, DailyScoreUpsert};
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::dates;

const POINTS_PER_HABIT: i64 = 100;

/// Derives one score row per (user, day) from the habit registry and the
/// completion store. The only writer of `daily_scores`.
pub struct ScoreService {
    db: DbPool,
    clock: Arc<dyn Clock>,
}

impl ScoreService {
    pub fn new(db: DbPool) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Recompute and upsert the score for one (user, calendar day).
    ///
    /// Invoked synchronously on every completion toggle, so reads issued
    /// after the toggle acknowledges never see a stale score. Recomputing
    /// with unchanged inputs rewrites the row with identical derived fields;
    /// created_at keeps its original value.
    pub fn calculate_daily_score(&self, user_id: &str, date: &str) -> AppResult<DailyScoreRecord> {
        let day = dates::normalize_day(date)?;
        self.calculate_for_day(user_id, day)
    }

    pub(crate) fn calculate_for_day(
        &self,
        user_id: &str,
        day: NaiveDate,
    ) -> AppResult<DailyScoreRecord> {
        let conn = self.db.get_connection()?;

        // Snapshot at calculation time; a habit deactivated later does not
        // rewrite scores already derived from it.
        let total_habits = HabitRepository::count_active(&conn, user_id)?;
        let completed_habits = CompletionRepository::count_completed(&conn, user_id, &day)?;

        let score = completed_habits * POINTS_PER_HABIT;
        let percentage = if total_habits > 0 {
            completed_habits as f64 / total_habits as f64 * 100.0
        } else {
            0.0
        };

        let upsert = DailyScoreUpsert {
            user_id: user_id.to_string(),
            score_date: day.to_string(),
            total_habits,
            completed_habits,
            score,
            percentage,
            recorded_at: self.clock.now().to_rfc3339(),
        };

        ScoreRepository::upsert_score(&conn, &upsert)?;
        debug!(
            target: "app::scores",
            user_id,
            day = %day,
            total_habits,
            completed_habits,
            score,
            "daily score recalculated"
        );

        ScoreRepository::find_by_day(&conn, user_id, &day)?
            .ok_or_else(|| AppError::other("Failed to retrieve persisted score"))
    }

    /// Re-run the calculation once per calendar day in `[start, end]`,
    /// ascending. Used for backfill after bulk data changes. A per-day
    /// failure surfaces immediately; days already recalculated stay written.
    pub fn recalculate_range(
        &self,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<Vec<DailyScoreRecord>> {
        let start = dates::normalize_day(start_date)?;
        let end = dates::normalize_day(end_date)?;
        dates::validate_range(start, end)?;

        let mut results = Vec::new();
        for day in dates::days_inclusive(start, end) {
            results.push(self.calculate_for_day(user_id, day)?);
        }

        debug!(
            target: "app::scores",
            user_id,
            start = %start,
            end = %end,
            days = results.len(),
            "score range recalculated"
        );

        Ok(results)
    }

    /// Ordered score rows for a user in an inclusive range.
    pub fn get_scores(
        &self,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<Vec<DailyScoreRecord>> {
        let start = dates::normalize_day(start_date)?;
        let end = dates::normalize_day(end_date)?;
        dates::validate_range(start, end)?;

        let conn = self.db.get_connection()?;
        ScoreRepository::list_range(&conn, user_id, &start, &end)
    }
}
