use tracing::debug;

use crate::db::repositories::completion_repository::CompletionRepository;
use crate::db::repositories::habit_repository::HabitRepository;
use crate::db::repositories::score_repository::ScoreRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::completion::CompletionRecord;
use crate::models::score::DailyScoreRecord;
use crate::models::stats::{CompletionRateSummary, HabitCompletionRate, ScoreStats};
use crate::utils::dates;

/// Read-only aggregations over the score and completion stores. Every
/// result is recomputed from the stored rows on each call; nothing here
/// mutates state.
pub struct StatsService {
    db: DbPool,
}

impl StatsService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Rolling statistics for a user over an inclusive date range.
    ///
    /// Streaks are computed over the returned row sequence: a calendar day
    /// without a score row breaks a streak the same way a non-100% day
    /// does.
    pub fn get_score_stats(
        &self,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<ScoreStats> {
        let start = dates::normalize_day(start_date)?;
        let end = dates::normalize_day(end_date)?;
        dates::validate_range(start, end)?;

        let conn = self.db.get_connection()?;
        let scores = ScoreRepository::list_range(&conn, user_id, &start, &end)?;
        debug!(
            target: "app::stats",
            user_id,
            start = %start,
            end = %end,
            rows = scores.len(),
            "score stats computed"
        );

        Ok(fold_stats(scores))
    }

    /// Completed days over calendar days for one habit in `[start, end]`.
    pub fn habit_completion_rate(
        &self,
        user_id: &str,
        habit_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<CompletionRateSummary> {
        let start = dates::normalize_day(start_date)?;
        let end = dates::normalize_day(end_date)?;
        dates::validate_range(start, end)?;

        let conn = self.db.get_connection()?;
        let completed_days =
            CompletionRepository::count_completed_for_habit(&conn, user_id, habit_id, &start, &end)?;
        let total_days = (end - start).num_days() + 1;
        let rate = if total_days > 0 {
            completed_days as f64 / total_days as f64 * 100.0
        } else {
            0.0
        };

        Ok(CompletionRateSummary {
            completed_days,
            total_days,
            rate,
        })
    }

    /// One rate entry per active habit for a calendar month, for the
    /// completion-rates dashboard.
    pub fn monthly_completion_rates(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<HabitCompletionRate>> {
        let total_days = dates::days_in_month(year, month)?;
        let first = dates::normalize_day(&format!("{year:04}-{month:02}-01"))?;
        let (start, end) = dates::month_bounds(first);

        let conn = self.db.get_connection()?;
        let habits = HabitRepository::list_active(&conn, user_id)?;

        let mut rates = Vec::with_capacity(habits.len());
        for habit in habits {
            let completed_days = CompletionRepository::count_completed_for_habit(
                &conn, user_id, &habit.id, &start, &end,
            )?;
            let rate = if total_days > 0 {
                (completed_days as f64 / total_days as f64 * 100.0).round() as i64
            } else {
                0
            };

            rates.push(HabitCompletionRate {
                habit_id: habit.id,
                name: habit.name,
                color: habit.color,
                completed_days,
                total_days,
                completion_rate: rate,
            });
        }

        Ok(rates)
    }

    /// Ordered completion rows for calendar views.
    pub fn get_completions(
        &self,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<Vec<CompletionRecord>> {
        let start = dates::normalize_day(start_date)?;
        let end = dates::normalize_day(end_date)?;
        dates::validate_range(start, end)?;

        let conn = self.db.get_connection()?;
        CompletionRepository::list_range(&conn, user_id, &start, &end)
    }

    pub fn get_habit_completions(
        &self,
        user_id: &str,
        habit_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<Vec<CompletionRecord>> {
        let start = dates::normalize_day(start_date)?;
        let end = dates::normalize_day(end_date)?;
        dates::validate_range(start, end)?;

        let conn = self.db.get_connection()?;
        CompletionRepository::list_range_for_habit(&conn, user_id, habit_id, &start, &end)
    }
}

/// Deterministic fold from an ascending score sequence to its statistics.
fn fold_stats(scores: Vec<DailyScoreRecord>) -> ScoreStats {
    if scores.is_empty() {
        return ScoreStats::default();
    }

    let count = scores.len() as i64;
    let total_score: i64 = scores.iter().map(|record| record.score).sum();
    let percentage_sum: f64 = scores.iter().map(|record| record.percentage).sum();

    let average_score = (total_score as f64 / count as f64).round() as i64;
    let average_percentage = (percentage_sum / count as f64).round() as i64;

    // Earliest date wins score ties: only a strictly greater score replaces
    // the running best.
    let mut best_day = &scores[0];
    for record in &scores[1..] {
        if record.score > best_day.score {
            best_day = record;
        }
    }
    let best_day = best_day.clone();

    let current_streak = scores
        .iter()
        .rev()
        .take_while(|record| record.is_perfect_day())
        .count() as i64;

    let mut longest_streak = 0i64;
    let mut running = 0i64;
    for record in &scores {
        if record.is_perfect_day() {
            running += 1;
            longest_streak = longest_streak.max(running);
        } else {
            running = 0;
        }
    }

    ScoreStats {
        total_score,
        average_score,
        average_percentage,
        best_day: Some(best_day),
        current_streak,
        longest_streak,
        scores,
    }
}
