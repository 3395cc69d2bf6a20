use std::convert::TryFrom;

use chrono::NaiveDate;
use rusqlite::{named_params, Connection, Row};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::completion::{CompletionRecord, CompletionUpsert};

#[derive(Debug, Clone)]
pub struct CompletionRow {
    pub id: String,
    pub user_id: String,
    pub habit_id: String,
    pub completion_date: String,
    pub completed: bool,
    pub notes: Option<String>,
    pub created_at: String,
}

impl CompletionRow {
    pub fn into_record(self) -> CompletionRecord {
        CompletionRecord {
            id: self.id,
            user_id: self.user_id,
            habit_id: self.habit_id,
            completion_date: self.completion_date,
            completed: self.completed,
            notes: self.notes,
            created_at: self.created_at,
        }
    }
}

impl TryFrom<&Row<'_>> for CompletionRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            habit_id: row.get("habit_id")?,
            completion_date: row.get("completion_date")?,
            completed: row.get("completed")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Store interface for the completion-toggle collaborator. The scoring
/// engine itself only reads the counting and range queries.
pub struct CompletionRepository;

impl CompletionRepository {
    pub fn upsert_completion(conn: &Connection, input: &CompletionUpsert) -> AppResult<()> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        conn.execute(
            r#"
                INSERT INTO habit_completions (
                    id,
                    user_id,
                    habit_id,
                    completion_date,
                    completed,
                    notes,
                    created_at
                ) VALUES (
                    :id,
                    :user_id,
                    :habit_id,
                    :completion_date,
                    :completed,
                    :notes,
                    :created_at
                )
                ON CONFLICT(user_id, habit_id, completion_date) DO UPDATE SET
                    completed = excluded.completed,
                    notes = COALESCE(excluded.notes, notes)
            "#,
            named_params! {
                ":id": &id,
                ":user_id": &input.user_id,
                ":habit_id": &input.habit_id,
                ":completion_date": &input.completion_date,
                ":completed": &input.completed,
                ":notes": &input.notes,
                ":created_at": &created_at,
            },
        )?;

        Ok(())
    }

    /// Completed habits for one (user, day); feeds the score calculation.
    pub fn count_completed(conn: &Connection, user_id: &str, day: &NaiveDate) -> AppResult<i64> {
        let count = conn.query_row(
            r#"
                SELECT COUNT(*)
                FROM habit_completions
                WHERE user_id = :user_id
                  AND completion_date = :completion_date
                  AND completed = 1
            "#,
            named_params! {
                ":user_id": user_id,
                ":completion_date": day.to_string(),
            },
            |row| row.get(0),
        )?;

        Ok(count)
    }

    /// Completed days for one habit in an inclusive range; feeds the
    /// completion-rate views.
    pub fn count_completed_for_habit(
        conn: &Connection,
        user_id: &str,
        habit_id: &str,
        start: &NaiveDate,
        end: &NaiveDate,
    ) -> AppResult<i64> {
        let count = conn.query_row(
            r#"
                SELECT COUNT(*)
                FROM habit_completions
                WHERE user_id = :user_id
                  AND habit_id = :habit_id
                  AND completion_date >= :start
                  AND completion_date <= :end
                  AND completed = 1
            "#,
            named_params! {
                ":user_id": user_id,
                ":habit_id": habit_id,
                ":start": start.to_string(),
                ":end": end.to_string(),
            },
            |row| row.get(0),
        )?;

        Ok(count)
    }

    pub fn list_range(
        conn: &Connection,
        user_id: &str,
        start: &NaiveDate,
        end: &NaiveDate,
    ) -> AppResult<Vec<CompletionRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    id,
                    user_id,
                    habit_id,
                    completion_date,
                    completed,
                    notes,
                    created_at
                FROM habit_completions
                WHERE user_id = :user_id
                  AND completion_date >= :start
                  AND completion_date <= :end
                ORDER BY completion_date ASC
            "#,
        )?;

        let rows = stmt
            .query_map(
                named_params! {
                    ":user_id": user_id,
                    ":start": start.to_string(),
                    ":end": end.to_string(),
                },
                |row| CompletionRow::try_from(row),
            )?
            .map(|row| row.map(CompletionRow::into_record).map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    pub fn list_range_for_habit(
        conn: &Connection,
        user_id: &str,
        habit_id: &str,
        start: &NaiveDate,
        end: &NaiveDate,
    ) -> AppResult<Vec<CompletionRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    id,
                    user_id,
                    habit_id,
                    completion_date,
                    completed,
                    notes,
                    created_at
                FROM habit_completions
                WHERE user_id = :user_id
                  AND habit_id = :habit_id
                  AND completion_date >= :start
                  AND completion_date <= :end
                ORDER BY completion_date ASC
            "#,
        )?;

        let rows = stmt
            .query_map(
                named_params! {
                    ":user_id": user_id,
                    ":habit_id": habit_id,
                    ":start": start.to_string(),
                    ":end": end.to_string(),
                },
                |row| CompletionRow::try_from(row),
            )?
            .map(|row| row.map(CompletionRow::into_record).map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }
}
