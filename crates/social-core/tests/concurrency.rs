//! Many callers opening the same conversation at once.

use std::sync::{Arc, Barrier};
use std::thread;

use social_core::threads;
use social_db::Database;
use uuid::Uuid;

const CALLERS: usize = 8;
const ROUNDS: usize = 10;

#[test]
fn concurrent_opens_share_one_thread() {
    for _ in 0..ROUNDS {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        db.create_user(a, "alice", "hash").unwrap();
        db.create_user(b, "bob", "hash").unwrap();

        let barrier = Arc::new(Barrier::new(CALLERS));
        let handles: Vec<_> = (0..CALLERS)
            .map(|i| {
                let db = Arc::clone(&db);
                let barrier = Arc::clone(&barrier);
                // Alternate argument order so both directions race.
                let (from, to) = if i % 2 == 0 { (a, b) } else { (b, a) };
                thread::spawn(move || {
                    barrier.wait();
                    threads::open_or_create_thread(&db, from, to).unwrap().id
                })
            })
            .collect();

        let ids: Vec<Uuid> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(ids.iter().all(|id| *id == ids[0]), "callers saw different threads: {:?}", ids);

        let listed = threads::list_threads_for_user(&db, a).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].thread.id, ids[0]);
        assert_eq!(threads::list_threads_for_user(&db, b).unwrap().len(), 1);
    }
}
