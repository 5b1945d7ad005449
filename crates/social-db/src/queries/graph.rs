use anyhow::Result;
use rusqlite::{Connection, TransactionBehavior};
use social_types::models::Follow;
use uuid::Uuid;

use super::{OptionalExt, is_unique_violation};
use crate::Database;
use crate::models::{Toggled, count_at, format_ts, now, ts_at, uuid_at};

impl Database {
    // -- Follows --

    /// Create the follow edge if absent, otherwise delete it.
    pub fn toggle_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<Toggled> {
        let follower = follower_id.to_string();
        let following = following_id.to_string();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT 1 FROM follows WHERE follower_id = ?1 AND following_id = ?2",
                    [&follower, &following],
                    |row| row.get(0),
                )
                .optional()?;

            let outcome = if existing.is_some() {
                tx.execute(
                    "DELETE FROM follows WHERE follower_id = ?1 AND following_id = ?2",
                    [&follower, &following],
                )?;
                Toggled::Removed
            } else {
                match tx.execute(
                    "INSERT INTO follows (follower_id, following_id, created_at) VALUES (?1, ?2, ?3)",
                    [&follower, &following, &format_ts(&now())],
                ) {
                    Ok(_) => Toggled::Created,
                    Err(e) if is_unique_violation(&e) => Toggled::AlreadyPresent,
                    Err(e) => return Err(e.into()),
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
    }

    pub fn is_following(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ?1 AND following_id = ?2)",
                [follower_id.to_string(), following_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(found)
        })
    }

    /// Edges pointing at `user_id`, newest first.
    pub fn list_followers(&self, user_id: Uuid) -> Result<Vec<Follow>> {
        self.with_conn(|conn| query_follows(conn, "following_id", user_id))
    }

    /// Edges leaving `user_id`, newest first.
    pub fn list_following(&self, user_id: Uuid) -> Result<Vec<Follow>> {
        self.with_conn(|conn| query_follows(conn, "follower_id", user_id))
    }

    /// (followers, following)
    pub fn follow_counts(&self, user_id: Uuid) -> Result<(usize, usize)> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM follows WHERE following_id = ?1),
                    (SELECT COUNT(*) FROM follows WHERE follower_id = ?1)",
                [user_id.to_string()],
                |row| Ok((count_at(row, 0)?, count_at(row, 1)?)),
            )?;
            Ok(counts)
        })
    }
}

fn query_follows(conn: &Connection, column: &str, user_id: Uuid) -> Result<Vec<Follow>> {
    let sql = format!(
        "SELECT follower_id, following_id, created_at FROM follows
         WHERE {} = ?1
         ORDER BY created_at DESC, rowid DESC",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map([user_id.to_string()], |row| {
            Ok(Follow {
                follower_id: uuid_at(row, 0)?,
                following_id: uuid_at(row, 1)?,
                created_at: ts_at(row, 2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
