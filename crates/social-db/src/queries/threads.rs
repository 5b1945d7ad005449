use anyhow::Result;
use rusqlite::Row;
use social_types::api::ThreadSummary;
use social_types::models::Thread;
use uuid::Uuid;

use super::{OptionalExt, is_unique_violation};
use crate::Database;
use crate::models::{count_at, format_ts, ts_at, uuid_at};

const THREAD_COLUMNS: &str = "id, user_low, user_high, created_at, updated_at";

impl Database {
    // -- Threads --

    /// Look up the thread for an already-canonical pair.
    pub fn find_thread_by_pair(&self, user_low: Uuid, user_high: Uuid) -> Result<Option<Thread>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {} FROM threads WHERE user_low = ?1 AND user_high = ?2",
                    THREAD_COLUMNS
                ),
                [user_low.to_string(), user_high.to_string()],
                thread_from_row,
            )
            .optional()
        })
    }

    /// Conditional insert. Returns `false` when `UNIQUE(user_low, user_high)`
    /// rejected the row because another writer created the pair first.
    pub fn insert_thread(&self, thread: &Thread) -> Result<bool> {
        self.with_conn(|conn| {
            let result = conn.execute(
                "INSERT INTO threads (id, user_low, user_high, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (
                    thread.id.to_string(),
                    thread.user_low.to_string(),
                    thread.user_high.to_string(),
                    format_ts(&thread.created_at),
                    format_ts(&thread.updated_at),
                ),
            );
            match result {
                Ok(_) => Ok(true),
                Err(e) if is_unique_violation(&e) => Ok(false),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_thread(&self, id: Uuid) -> Result<Option<Thread>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM threads WHERE id = ?1", THREAD_COLUMNS),
                [id.to_string()],
                thread_from_row,
            )
            .optional()
        })
    }

    /// Every thread `user_id` takes part in, most recently active first, each
    /// with the number of messages from the other side still unread.
    pub fn list_threads_for_user(&self, user_id: Uuid) -> Result<Vec<ThreadSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.user_low, t.user_high, t.created_at, t.updated_at,
                        (SELECT COUNT(*) FROM messages m
                         WHERE m.thread_id = t.id
                           AND m.sender_id <> ?1
                           AND m.read_at IS NULL)
                 FROM threads t
                 WHERE t.user_low = ?1 OR t.user_high = ?1
                 ORDER BY t.updated_at DESC, t.rowid DESC",
            )?;

            let rows = stmt
                .query_map([user_id.to_string()], |row| {
                    let thread = thread_from_row(row)?;
                    let other_user_id = if thread.user_low == user_id {
                        thread.user_high
                    } else {
                        thread.user_low
                    };
                    Ok(ThreadSummary {
                        thread,
                        other_user_id,
                        unread_count: count_at(row, 5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

fn thread_from_row(row: &Row<'_>) -> rusqlite::Result<Thread> {
    Ok(Thread {
        id: uuid_at(row, 0)?,
        user_low: uuid_at(row, 1)?,
        user_high: uuid_at(row, 2)?,
        created_at: ts_at(row, 3)?,
        updated_at: ts_at(row, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::now;

    fn seed_users(db: &Database) -> (Uuid, Uuid) {
        let a = Uuid::from_u128(1);
        let b = Uuid::from_u128(2);
        db.create_user(a, "alice", "x").unwrap();
        db.create_user(b, "bob", "x").unwrap();
        (a, b)
    }

    fn thread(low: Uuid, high: Uuid) -> Thread {
        let ts = now();
        Thread {
            id: Uuid::new_v4(),
            user_low: low,
            user_high: high,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn second_insert_for_same_pair_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let (a, b) = seed_users(&db);

        let first = thread(a, b);
        assert!(db.insert_thread(&first).unwrap());
        assert!(!db.insert_thread(&thread(a, b)).unwrap());

        let found = db.find_thread_by_pair(a, b).unwrap().unwrap();
        assert_eq!(found.id, first.id);
    }

    #[test]
    fn schema_refuses_non_canonical_pairs() {
        let db = Database::open_in_memory().unwrap();
        let (a, b) = seed_users(&db);

        assert!(db.insert_thread(&thread(b, a)).is_err());
        assert!(db.insert_thread(&thread(a, a)).is_err());
    }

    #[test]
    fn lists_threads_for_both_participants() {
        let db = Database::open_in_memory().unwrap();
        let (a, b) = seed_users(&db);
        let t = thread(a, b);
        db.insert_thread(&t).unwrap();

        let for_a = db.list_threads_for_user(a).unwrap();
        let for_b = db.list_threads_for_user(b).unwrap();
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a[0].other_user_id, b);
        assert_eq!(for_b[0].other_user_id, a);
        assert_eq!(for_b[0].unread_count, 0);
    }
}
