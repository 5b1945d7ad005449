use anyhow::Result;
use rusqlite::Row;
use rusqlite::types::Type;
use social_types::models::{Notification, Verb};
use uuid::Uuid;

use super::OptionalExt;
use crate::Database;
use crate::models::{count_at, format_ts, opt_uuid_at, ts_at, uuid_at};

const NOTIFICATION_COLUMNS: &str = "id, recipient_id, verb, actor_id, post_id, is_read, created_at";

impl Database {
    // -- Notifications --

    pub fn insert_notification(&self, notification: &Notification) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notifications (id, recipient_id, verb, actor_id, post_id, is_read, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                (
                    notification.id.to_string(),
                    notification.recipient_id.to_string(),
                    notification.verb.as_str(),
                    notification.actor_id.map(|a| a.to_string()),
                    notification.post_id.map(|p| p.to_string()),
                    notification.is_read,
                    format_ts(&notification.created_at),
                ),
            )?;
            Ok(())
        })
    }

    pub fn get_notification(&self, id: Uuid) -> Result<Option<Notification>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM notifications WHERE id = ?1", NOTIFICATION_COLUMNS),
                [id.to_string()],
                notification_from_row,
            )
            .optional()
        })
    }

    /// Flip `is_read` on. Already-read rows are left untouched.
    pub fn set_notification_read(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND is_read = 0",
                [id.to_string()],
            )?;
            Ok(n > 0)
        })
    }

    pub fn mark_all_notifications_read(&self, recipient_id: Uuid) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE notifications SET is_read = 1 WHERE recipient_id = ?1 AND is_read = 0",
                [recipient_id.to_string()],
            )?;
            Ok(n)
        })
    }

    /// Inbox, newest first.
    pub fn list_notifications(&self, recipient_id: Uuid) -> Result<Vec<Notification>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM notifications
                 WHERE recipient_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
                NOTIFICATION_COLUMNS
            ))?;

            let rows = stmt
                .query_map([recipient_id.to_string()], notification_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn count_unread_notifications(&self, recipient_id: Uuid) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE recipient_id = ?1 AND is_read = 0",
                [recipient_id.to_string()],
                |row| count_at(row, 0),
            )?;
            Ok(n)
        })
    }
}

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    let verb: String = row.get(2)?;
    let verb: Verb = verb
        .parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, e.into()))?;

    Ok(Notification {
        id: uuid_at(row, 0)?,
        recipient_id: uuid_at(row, 1)?,
        verb,
        actor_id: opt_uuid_at(row, 3)?,
        post_id: opt_uuid_at(row, 4)?,
        is_read: row.get(5)?,
        created_at: ts_at(row, 6)?,
    })
}
