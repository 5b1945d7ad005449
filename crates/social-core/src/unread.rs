//! Unread accounting. Counts are recomputed from the ledger on every call,
//! so they can never drift from the messages' `read_at` state.

use social_db::Database;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::threads::get_thread;

/// Messages in the thread sent by the other participant and not yet read.
pub fn unread_count_for_thread(db: &Database, thread_id: Uuid, user: Uuid) -> CoreResult<usize> {
    let thread = get_thread(db, thread_id)?;
    if !thread.has_participant(user) {
        return Err(CoreError::Forbidden(
            "only the two participants can access this conversation".into(),
        ));
    }
    Ok(db.count_unread_in_thread(thread.id, user)?)
}

/// Sum of [`unread_count_for_thread`] over every thread the user belongs to.
pub fn unread_count_global(db: &Database, user: Uuid) -> CoreResult<usize> {
    Ok(db.count_unread_for_user(user)?)
}
