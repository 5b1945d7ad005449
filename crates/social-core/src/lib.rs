//! Core rules of the social network: thread identity, the message ledger and
//! its unread accounting, the follow graph, the post/comment action surface
//! and the notification fan-out those actions trigger.
//!
//! Every operation is a synchronous function over a [`Database`] and takes the
//! acting user's id explicitly. Callers on an async runtime are expected to
//! run these through `spawn_blocking`.
//!
//! [`Database`]: social_db::Database

pub mod error;
pub mod graph;
pub mod ledger;
pub mod notify;
pub mod posts;
pub mod threads;
pub mod unread;

mod text;

pub use error::{CoreError, CoreResult};

#[cfg(test)]
pub(crate) mod testing {
    use social_db::Database;
    use uuid::Uuid;

    /// In-memory store with one account per name, ids in the given order.
    pub fn db_with_users(names: &[&str]) -> (Database, Vec<Uuid>) {
        let db = Database::open_in_memory().unwrap();
        let ids = names
            .iter()
            .map(|name| {
                let id = Uuid::new_v4();
                db.create_user(id, name, "not-a-hash").unwrap();
                id
            })
            .collect();
        (db, ids)
    }
}
