use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::habit::{HabitCreateInput, HabitRecord};

const DEFAULT_COLOR: &str = "#10b981";

#[derive(Debug, Clone)]
pub struct HabitRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub is_active: bool,
    pub created_at: String,
}

impl HabitRow {
    pub fn into_record(self) -> HabitRecord {
        HabitRecord {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            color: self.color,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

impl TryFrom<&Row<'_>> for HabitRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            color: row.get("color")?,
            is_active: row.get("is_active")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Habit registry store. CRUD belongs to the habit-management collaborator;
/// the engine consumes `count_active` as the per-day habit snapshot.
pub struct HabitRepository;

impl HabitRepository {
    pub fn insert(conn: &Connection, input: &HabitCreateInput) -> AppResult<HabitRecord> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        let color = input.color.clone().unwrap_or_else(|| DEFAULT_COLOR.into());

        conn.execute(
            r#"
                INSERT INTO habits (id, user_id, name, color, is_active, created_at)
                VALUES (:id, :user_id, :name, :color, 1, :created_at)
            "#,
            named_params! {
                ":id": &id,
                ":user_id": &input.user_id,
                ":name": &input.name,
                ":color": &color,
                ":created_at": &created_at,
            },
        )?;

        Ok(HabitRecord {
            id,
            user_id: input.user_id.clone(),
            name: input.name.clone(),
            color,
            is_active: true,
            created_at,
        })
    }

    /// Snapshot of the user's active habit count at call time. A later
    /// deactivation does not rewrite scores already derived from it.
    pub fn count_active(conn: &Connection, user_id: &str) -> AppResult<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM habits WHERE user_id = :user_id AND is_active = 1",
            named_params! {":user_id": user_id},
            |row| row.get(0),
        )?;

        Ok(count)
    }

    pub fn list_active(conn: &Connection, user_id: &str) -> AppResult<Vec<HabitRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT id, user_id, name, color, is_active, created_at
                FROM habits
                WHERE user_id = :user_id AND is_active = 1
                ORDER BY created_at DESC
            "#,
        )?;

        let rows = stmt
            .query_map(named_params! {":user_id": user_id}, |row| {
                HabitRow::try_from(row)
            })?
            .map(|row| row.map(HabitRow::into_record).map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }

    /// Soft delete / reactivation, as the habit collaborator performs it.
    pub fn set_active(conn: &Connection, habit_id: &str, is_active: bool) -> AppResult<()> {
        let changed = conn.execute(
            "UPDATE habits SET is_active = :is_active WHERE id = :id",
            named_params! {
                ":id": habit_id,
                ":is_active": &is_active,
            },
        )?;

        if changed == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }
}
