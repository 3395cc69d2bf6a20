use std::sync::Arc;

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::completion::CompletionRecord;
use crate::models::leaderboard::LeaderboardEntry;
use crate::models::score::DailyScoreRecord;
use crate::models::stats::{CompletionRateSummary, HabitCompletionRate, ScoreStats};
use crate::services::leaderboard_service::LeaderboardService;
use crate::services::score_service::ScoreService;
use crate::services::stats_service::StatsService;
use crate::utils::clock::{Clock, SystemClock};

/// Transport-agnostic facade over the scoring engine, wiring the services
/// the way a hosting application would. Collaborators call this after a
/// completion toggle and for every stats or leaderboard read.
#[derive(Clone)]
pub struct ScoringEngine {
    db_pool: DbPool,
    score_service: Arc<ScoreService>,
    stats_service: Arc<StatsService>,
    leaderboard_service: Arc<LeaderboardService>,
}

impl ScoringEngine {
    pub fn new(db_pool: DbPool) -> Self {
        Self::with_clock(db_pool, Arc::new(SystemClock))
    }

    pub fn with_clock(db_pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        let score_service = Arc::new(ScoreService::with_clock(
            db_pool.clone(),
            Arc::clone(&clock),
        ));
        let stats_service = Arc::new(StatsService::new(db_pool.clone()));
        let leaderboard_service = Arc::new(LeaderboardService::with_clock(
            db_pool.clone(),
            Arc::clone(&clock),
        ));

        Self {
            db_pool,
            score_service,
            stats_service,
            leaderboard_service,
        }
    }

    /// Entry point for the completion-toggle collaborator. Runs
    /// synchronously so the acknowledged toggle is already reflected in any
    /// subsequent stats or leaderboard read.
    pub fn record_completion_change(
        &self,
        user_id: &str,
        date: &str,
    ) -> AppResult<DailyScoreRecord> {
        self.score_service.calculate_daily_score(user_id, date)
    }

    pub fn fetch_scores(
        &self,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<Vec<DailyScoreRecord>> {
        self.score_service.get_scores(user_id, start_date, end_date)
    }

    pub fn fetch_stats(
        &self,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<ScoreStats> {
        self.stats_service
            .get_score_stats(user_id, start_date, end_date)
    }

    pub fn fetch_leaderboard(&self) -> AppResult<Vec<LeaderboardEntry>> {
        self.leaderboard_service.get_leaderboard()
    }

    /// Backfill/repair: recalculate every day in the inclusive range.
    pub fn recalculate_range(
        &self,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<Vec<DailyScoreRecord>> {
        self.score_service
            .recalculate_range(user_id, start_date, end_date)
    }

    pub fn fetch_completions(
        &self,
        user_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<Vec<CompletionRecord>> {
        self.stats_service
            .get_completions(user_id, start_date, end_date)
    }

    pub fn fetch_habit_completions(
        &self,
        user_id: &str,
        habit_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<Vec<CompletionRecord>> {
        self.stats_service
            .get_habit_completions(user_id, habit_id, start_date, end_date)
    }

    pub fn fetch_habit_completion_rate(
        &self,
        user_id: &str,
        habit_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> AppResult<CompletionRateSummary> {
        self.stats_service
            .habit_completion_rate(user_id, habit_id, start_date, end_date)
    }

    pub fn fetch_monthly_completion_rates(
        &self,
        user_id: &str,
        year: i32,
        month: u32,
    ) -> AppResult<Vec<HabitCompletionRate>> {
        self.stats_service
            .monthly_completion_rates(user_id, year, month)
    }

    pub fn db_pool(&self) -> &DbPool {
        &self.db_pool
    }
}
