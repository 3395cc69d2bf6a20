use std::convert::TryFrom;

use chrono::NaiveDate;
use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::models::score::{DailyScoreRecord, DailyScoreUpsert};

#[derive(Debug, Clone)]
pub struct DailyScoreRow {
    pub user_id: String,
    pub score_date: String,
    pub total_habits: i64,
    pub completed_habits: i64,
    pub score: i64,
    pub percentage: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl DailyScoreRow {
    pub fn into_record(self) -> DailyScoreRecord {
        DailyScoreRecord {
            user_id: self.user_id,
            score_date: self.score_date,
            total_habits: self.total_habits,
            completed_habits: self.completed_habits,
            score: self.score,
            percentage: self.percentage,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl TryFrom<&Row<'_>> for DailyScoreRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.get("user_id")?,
            score_date: row.get("score_date")?,
            total_habits: row.get("total_habits")?,
            completed_habits: row.get("completed_habits")?,
            score: row.get("score")?,
            percentage: row.get("percentage")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Monthly total per user, joined with profile display fields for the
/// leaderboard.
#[derive(Debug, Clone)]
pub struct UserScoreTotalRow {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub joined_at: String,
    pub total_score: i64,
}

pub struct ScoreRepository;

impl ScoreRepository {
    /// Upsert keyed by (user, day). Derived columns and updated_at are
    /// rewritten; created_at keeps its insert-time value.
    pub fn upsert_score(conn: &Connection, input: &DailyScoreUpsert) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO daily_scores (
                    user_id,
                    score_date,
                    total_habits,
                    completed_habits,
                    score,
                    percentage,
                    created_at,
                    updated_at
                ) VALUES (
                    :user_id,
                    :score_date,
                    :total_habits,
                    :completed_habits,
                    :score,
                    :percentage,
                    :recorded_at,
                    :recorded_at
                )
                ON CONFLICT(user_id, score_date) DO UPDATE SET
                    total_habits = excluded.total_habits,
                    completed_habits = excluded.completed_habits,
                    score = excluded.score,
                    percentage = excluded.percentage,
                    updated_at = excluded.updated_at
            "#,
            named_params! {
                ":user_id": &input.user_id,
                ":score_date": &input.score_date,
                ":total_habits": &input.total_habits,
                ":completed_habits": &input.completed_habits,
                ":score": &input.score,
                ":percentage": &input.percentage,
                ":recorded_at": &input.recorded_at,
            },
        )?;

        Ok(())
    }

    pub fn find_by_day(
        conn: &Connection,
        user_id: &str,
        day: &NaiveDate,
    ) -> AppResult<Option<DailyScoreRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    user_id,
                    score_date,
                    total_habits,
                    completed_habits,
                    score,
                    percentage,
                    created_at,
                    updated_at
                FROM daily_scores
                WHERE user_id = :user_id AND score_date = :score_date
            "#,
        )?;

        let row = stmt
            .query_row(
                named_params! {
                    ":user_id": user_id,
                    ":score_date": day.to_string(),
                },
                |row| DailyScoreRow::try_from(row),
            )
            .optional()?;

        Ok(row.map(DailyScoreRow::into_record))
    }

    /// All score rows for a user in `[start, end]`, ascending by date. ISO
    /// date strings compare lexicographically, so TEXT ordering is date
    /// ordering.
    pub fn list_range(
        conn: &Connection,
        user_id: &str,
        start: &NaiveDate,
        end: &NaiveDate,
    ) -> AppResult<Vec<DailyScoreRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    user_id,
                    score_date,
                    total_habits,
                    completed_habits,
                    score,
                    percentage,
                    created_at,
                    updated_at
                FROM daily_scores
                WHERE user_id = :user_id
                  AND score_date >= :start
                  AND score_date <= :end
                ORDER BY score_date ASC
            "#,
        )?;

        let rows = stmt
            .query_map(
                named_params! {
                    ":user_id": user_id,
                    ":start": start.to_string(),
                    ":end": end.to_string(),
                },
                |row| DailyScoreRow::try_from(row),
            )?
            .map(|row| row.map(DailyScoreRow::into_record).map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// Grouped month aggregation for the leaderboard: every user appears,
    /// users without rows in range sum to zero, ties order by user id.
    pub fn sum_by_user_in_range(
        conn: &Connection,
        start: &NaiveDate,
        end: &NaiveDate,
    ) -> AppResult<Vec<UserScoreTotalRow>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    u.id AS user_id,
                    u.username AS username,
                    u.email AS email,
                    u.created_at AS joined_at,
                    COALESCE(SUM(s.score), 0) AS total_score
                FROM users u
                LEFT JOIN daily_scores s
                    ON s.user_id = u.id
                    AND s.score_date >= :start
                    AND s.score_date <= :end
                GROUP BY u.id
                ORDER BY total_score DESC, u.id ASC
            "#,
        )?;

        let rows = stmt
            .query_map(
                named_params! {
                    ":start": start.to_string(),
                    ":end": end.to_string(),
                },
                |row| {
                    Ok(UserScoreTotalRow {
                        user_id: row.get("user_id")?,
                        username: row.get("username")?,
                        email: row.get("email")?,
                        joined_at: row.get("joined_at")?,
                        total_score: row.get("total_score")?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }
}
