//! End-to-end walk through a conversation and the social actions around it,
//! using only the public core API over an in-memory store.

use social_core::{graph, ledger, notify, posts, threads, unread};
use social_db::Database;
use social_types::models::Verb;
use uuid::Uuid;

fn user(db: &Database, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    db.create_user(id, name, "hash").unwrap();
    id
}

#[test]
fn message_read_receipt_round_trip() {
    let db = Database::open_in_memory().unwrap();
    let a = user(&db, "alice");
    let b = user(&db, "bob");

    // A sends "hi" to B; the thread is created on the way.
    assert!(threads::list_threads_for_user(&db, a).unwrap().is_empty());
    let thread = threads::open_or_create_thread(&db, a, b).unwrap();
    ledger::append_message(&db, thread.id, a, "hi").unwrap();
    assert_eq!(unread::unread_count_global(&db, b).unwrap(), 1);

    // B opens the conversation.
    let view = ledger::view_thread(&db, thread.id, b).unwrap();
    assert_eq!(view.marked_read, 1);
    assert_eq!(unread::unread_count_global(&db, b).unwrap(), 0);

    // B replies through the same thread, found from the other direction.
    let same = threads::open_or_create_thread(&db, b, a).unwrap();
    assert_eq!(same.id, thread.id);
    ledger::append_message(&db, same.id, b, "yo").unwrap();

    assert_eq!(unread::unread_count_for_thread(&db, thread.id, a).unwrap(), 1);
    assert_eq!(unread::unread_count_for_thread(&db, thread.id, b).unwrap(), 0);

    let inbox = threads::list_threads_for_user(&db, a).unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].other_user_id, b);
    assert_eq!(inbox[0].unread_count, 1);
}

#[test]
fn social_actions_fan_out_to_the_right_inboxes() {
    let db = Database::open_in_memory().unwrap();
    let a = user(&db, "alice");
    let b = user(&db, "bob");

    graph::toggle_follow(&db, a, b).unwrap();
    let post = posts::create_post(&db, b, "first post").unwrap();
    posts::toggle_like(&db, a, post.id).unwrap();
    let comment = posts::add_comment(&db, a, post.id, "congrats").unwrap();
    posts::add_reply(&db, b, comment.id, "thanks!").unwrap();
    posts::toggle_like(&db, b, post.id).unwrap();

    let inbox = notify::list_inbox(&db, b).unwrap();
    let verbs: Vec<Verb> = inbox.iter().map(|n| n.verb).collect();
    assert_eq!(verbs, vec![Verb::Comment, Verb::Like, Verb::Follow]);
    assert!(inbox.iter().all(|n| n.actor_id == Some(a)));
    assert!(notify::list_inbox(&db, a).unwrap().is_empty());

    assert_eq!(notify::unread_notification_count(&db, b).unwrap(), 3);
    let first = notify::mark_read(&db, inbox[0].id, b).unwrap();
    assert!(first.is_read);
    assert_eq!(notify::unread_notification_count(&db, b).unwrap(), 2);
    assert_eq!(notify::mark_all_read(&db, b).unwrap(), 2);
}
