//! Message ledger: append-only log per thread with a one-way read transition.

use social_db::Database;
use social_db::models::now;
use social_types::api::ThreadView;
use social_types::models::{Message, Thread};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::text::{MAX_MESSAGE_CHARS, clean};
use crate::threads::{get_thread, other_participant};

fn ensure_participant(thread: &Thread, user: Uuid) -> CoreResult<()> {
    if thread.has_participant(user) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "only the two participants can access this conversation".into(),
        ))
    }
}

/// Append a message from `sender` and move the thread to the top of both
/// participants' conversation lists.
pub fn append_message(
    db: &Database,
    thread_id: Uuid,
    sender: Uuid,
    text: &str,
) -> CoreResult<Message> {
    let thread = get_thread(db, thread_id)?;
    ensure_participant(&thread, sender)?;
    let text = clean("message", text, MAX_MESSAGE_CHARS)?;

    let message = Message {
        id: Uuid::new_v4(),
        thread_id,
        sender_id: sender,
        text,
        created_at: now(),
        read_at: None,
    };
    db.append_message(&message)?;

    info!("Message {} appended to thread {} by {}", message.id, thread_id, sender);
    Ok(message)
}

/// Messages in chronological order. Does not change read state.
pub fn list_messages(db: &Database, thread_id: Uuid) -> CoreResult<Vec<Message>> {
    let thread = get_thread(db, thread_id)?;
    Ok(db.list_messages(thread.id)?)
}

/// Mark every unread message the other participant sent as read.
/// Returns how many messages changed; a repeat call returns 0.
pub fn mark_incoming_as_read(db: &Database, thread_id: Uuid, viewer: Uuid) -> CoreResult<usize> {
    let thread = get_thread(db, thread_id)?;
    ensure_participant(&thread, viewer)?;

    let n = db.mark_incoming_read(thread_id, viewer, now())?;
    if n > 0 {
        debug!("{} marked {} message(s) read in thread {}", viewer, n, thread_id);
    }
    Ok(n)
}

/// A participant opening the conversation: incoming messages are marked read
/// first, so the returned messages already carry their `read_at`.
pub fn view_thread(db: &Database, thread_id: Uuid, viewer: Uuid) -> CoreResult<ThreadView> {
    let thread = get_thread(db, thread_id)?;
    ensure_participant(&thread, viewer)?;
    let other_user_id = other_participant(&thread, viewer)?;

    let marked_read = db.mark_incoming_read(thread_id, viewer, now())?;
    let messages = db.list_messages(thread_id)?;

    Ok(ThreadView {
        thread,
        other_user_id,
        marked_read,
        messages,
    })
}
