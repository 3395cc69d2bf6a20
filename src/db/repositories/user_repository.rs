use std::convert::TryFrom;

use rusqlite::{named_params, Connection, Row};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::user::{UserCreateInput, UserRecord};

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl UserRow {
    pub fn into_record(self) -> UserRecord {
        UserRecord {
            id: self.id,
            username: self.username,
            email: self.email,
            created_at: self.created_at,
        }
    }
}

impl TryFrom<&Row<'_>> for UserRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            email: row.get("email")?,
            created_at: row.get("created_at")?,
        })
    }
}

/// Profile store owned by the auth collaborator. The engine reads it for
/// leaderboard display fields and the global user list.
pub struct UserRepository;

impl UserRepository {
    pub fn insert(conn: &Connection, input: &UserCreateInput) -> AppResult<UserRecord> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        conn.execute(
            r#"
                INSERT INTO users (id, username, email, created_at)
                VALUES (:id, :username, :email, :created_at)
            "#,
            named_params! {
                ":id": &id,
                ":username": &input.username,
                ":email": &input.email,
                ":created_at": &created_at,
            },
        )?;

        Ok(UserRecord {
            id,
            username: input.username.clone(),
            email: input.email.clone(),
            created_at,
        })
    }

    pub fn list_all(conn: &Connection) -> AppResult<Vec<UserRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, username, email, created_at FROM users ORDER BY username ASC",
        )?;

        let rows = stmt
            .query_map([], |row| UserRow::try_from(row))?
            .map(|row| row.map(UserRow::into_record).map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(rows)
    }
}
