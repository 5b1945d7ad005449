use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use social_types::models::Message;
use uuid::Uuid;

use crate::Database;
use crate::models::{count_at, format_ts, opt_ts_at, ts_at, uuid_at};

impl Database {
    // -- Messages --

    /// Insert the message, then bump the owning thread's `updated_at` to the
    /// message's creation time. Both statements share one transaction.
    /// `updated_at` only moves forward: a send stamped before the current
    /// value leaves it alone.
    pub fn append_message(&self, message: &Message) -> Result<()> {
        let thread_id = message.thread_id.to_string();
        let created_at = format_ts(&message.created_at);

        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO messages (id, thread_id, sender_id, text, created_at, read_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, NULL)",
                (
                    message.id.to_string(),
                    &thread_id,
                    message.sender_id.to_string(),
                    &message.text,
                    &created_at,
                ),
            )?;

            let bumped = tx.execute(
                "UPDATE threads SET updated_at = MAX(updated_at, ?1) WHERE id = ?2",
                [&created_at, &thread_id],
            )?;
            if bumped == 0 {
                bail!("Thread {} vanished while appending a message", thread_id);
            }

            tx.commit()?;
            Ok(())
        })
    }

    /// Messages of a thread, oldest first.
    pub fn list_messages(&self, thread_id: Uuid) -> Result<Vec<Message>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, thread_id, sender_id, text, created_at, read_at
                 FROM messages
                 WHERE thread_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;

            let rows = stmt
                .query_map([thread_id.to_string()], |row| {
                    Ok(Message {
                        id: uuid_at(row, 0)?,
                        thread_id: uuid_at(row, 1)?,
                        sender_id: uuid_at(row, 2)?,
                        text: row.get(3)?,
                        created_at: ts_at(row, 4)?,
                        read_at: opt_ts_at(row, 5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Stamp `read_at` on every still-unread message in the thread that
    /// `viewer_id` did not send. A single UPDATE in its own transaction, so
    /// readers see either the whole batch or none of it.
    pub fn mark_incoming_read(
        &self,
        thread_id: Uuid,
        viewer_id: Uuid,
        at: DateTime<Utc>,
    ) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let n = tx.execute(
                "UPDATE messages SET read_at = ?1
                 WHERE thread_id = ?2 AND sender_id <> ?3 AND read_at IS NULL",
                [format_ts(&at), thread_id.to_string(), viewer_id.to_string()],
            )?;
            tx.commit()?;
            Ok(n)
        })
    }

    pub fn count_unread_in_thread(&self, thread_id: Uuid, user_id: Uuid) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM messages
                 WHERE thread_id = ?1 AND sender_id <> ?2 AND read_at IS NULL",
                [thread_id.to_string(), user_id.to_string()],
                |row| count_at(row, 0),
            )?;
            Ok(n)
        })
    }

    /// Unread incoming messages across every thread the user belongs to.
    pub fn count_unread_for_user(&self, user_id: Uuid) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM messages m
                 JOIN threads t ON t.id = m.thread_id
                 WHERE (t.user_low = ?1 OR t.user_high = ?1)
                   AND m.sender_id <> ?1
                   AND m.read_at IS NULL",
                [user_id.to_string()],
                |row| count_at(row, 0),
            )?;
            Ok(n)
        })
    }
}
