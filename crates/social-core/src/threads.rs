//! Thread registry: one canonical conversation per unordered pair of users.

use social_db::Database;
use social_db::models::now;
use social_types::api::ThreadSummary;
use social_types::models::Thread;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Two distinct user ids with the smaller one first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalPair {
    low: Uuid,
    high: Uuid,
}

impl CanonicalPair {
    pub fn new(a: Uuid, b: Uuid) -> CoreResult<Self> {
        if a == b {
            return Err(CoreError::InvalidOperation(
                "cannot open a conversation with yourself".into(),
            ));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    pub fn low(&self) -> Uuid {
        self.low
    }

    pub fn high(&self) -> Uuid {
        self.high
    }
}

/// Return the thread between `a` and `b`, creating it on first use.
///
/// Safe against concurrent callers for the same pair: the insert is
/// conditional on `UNIQUE(user_low, user_high)` and losing that race means
/// the winner's row is fetched and returned.
pub fn open_or_create_thread(db: &Database, a: Uuid, b: Uuid) -> CoreResult<Thread> {
    let pair = CanonicalPair::new(a, b)?;

    for user in [pair.low, pair.high] {
        if !db.user_exists(user)? {
            return Err(CoreError::NotFound("user"));
        }
    }

    if let Some(existing) = db.find_thread_by_pair(pair.low, pair.high)? {
        debug!("Reusing thread {} for {} / {}", existing.id, pair.low, pair.high);
        return Ok(existing);
    }

    let ts = now();
    let thread = Thread {
        id: Uuid::new_v4(),
        user_low: pair.low,
        user_high: pair.high,
        created_at: ts,
        updated_at: ts,
    };

    if db.insert_thread(&thread)? {
        info!("Created thread {} for {} / {}", thread.id, pair.low, pair.high);
        return Ok(thread);
    }

    debug!("Lost thread creation race for {} / {}", pair.low, pair.high);
    db.find_thread_by_pair(pair.low, pair.high)?
        .ok_or(CoreError::NotFound("thread"))
}

pub fn get_thread(db: &Database, thread_id: Uuid) -> CoreResult<Thread> {
    db.get_thread(thread_id)?.ok_or(CoreError::NotFound("thread"))
}

pub fn participants(thread: &Thread) -> (Uuid, Uuid) {
    thread.participants()
}

pub fn other_participant(thread: &Thread, user: Uuid) -> CoreResult<Uuid> {
    if thread.user_low == user {
        Ok(thread.user_high)
    } else if thread.user_high == user {
        Ok(thread.user_low)
    } else {
        Err(CoreError::NotParticipant)
    }
}

/// The user's conversations, most recently active first, with unread counts.
pub fn list_threads_for_user(db: &Database, user: Uuid) -> CoreResult<Vec<ThreadSummary>> {
    Ok(db.list_threads_for_user(user)?)
}
