use anyhow::Result;
use social_types::models::User;
use uuid::Uuid;

use super::OptionalExt;
use crate::Database;
use crate::models::{UserRow, format_ts, now, ts_at, uuid_at};

impl Database {
    // -- Users --

    pub fn create_user(&self, id: Uuid, username: &str, password_hash: &str) -> Result<User> {
        let created_at = now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password, created_at) VALUES (?1, ?2, ?3, ?4)",
                (id.to_string(), username, password_hash, format_ts(&created_at)),
            )?;
            Ok(User {
                id,
                username: username.to_string(),
                created_at,
            })
        })
    }

    /// Credentials row for login.
    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, username, password FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(UserRow {
                        id: row.get(0)?,
                        username: row.get(1)?,
                        password: row.get(2)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, username, created_at FROM users WHERE id = ?1",
                [id.to_string()],
                |row| {
                    Ok(User {
                        id: uuid_at(row, 0)?,
                        username: row.get(1)?,
                        created_at: ts_at(row, 2)?,
                    })
                },
            )
            .optional()
        })
    }

    pub fn user_exists(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
                [id.to_string()],
                |row| row.get(0),
            )?;
            Ok(found)
        })
    }

    /// Removes the account and everything it owns. Notifications it caused
    /// for other users survive with a NULL actor.
    pub fn delete_user(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM users WHERE id = ?1", [id.to_string()])?;
            Ok(n > 0)
        })
    }
}
