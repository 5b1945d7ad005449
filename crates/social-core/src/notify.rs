//! Notification dispatcher.
//!
//! Notifications are a side effect of follows, likes, comments and replies.
//! [`notify`] and [`dispatch`] are the fault-isolation boundary: whatever goes
//! wrong while recording a notification is logged here and reported as `None`,
//! never as an error the triggering action would have to handle.

use social_db::Database;
use social_db::models::now;
use social_types::events::SocialEvent;
use social_types::models::{Notification, Verb};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Record a notification for `recipient`. Best effort: at most one attempt,
/// failures are logged and swallowed.
pub fn notify(
    db: &Database,
    recipient: Uuid,
    verb: Verb,
    actor: Option<Uuid>,
    post_id: Option<Uuid>,
) -> Option<Notification> {
    let notification = Notification {
        id: Uuid::new_v4(),
        recipient_id: recipient,
        verb,
        actor_id: actor,
        post_id,
        is_read: false,
        created_at: now(),
    };

    match db.insert_notification(&notification) {
        Ok(()) => {
            info!("Notified {} of {} by {:?}", recipient, verb, actor);
            Some(notification)
        }
        Err(e) => {
            warn!("Dropping {} notification for {}: {:#}", verb, recipient, e);
            None
        }
    }
}

/// Map a social action onto at most one notification.
///
/// Removals never notify, and neither does acting on your own content.
pub fn dispatch(db: &Database, event: &SocialEvent) -> Option<Notification> {
    let (recipient, verb, post_id) = match *event {
        SocialEvent::FollowCreated { followed_id, .. } => (followed_id, Verb::Follow, None),
        SocialEvent::LikeCreated {
            post_id,
            post_author_id,
            ..
        } => (post_author_id, Verb::Like, Some(post_id)),
        SocialEvent::CommentCreated {
            post_id,
            post_author_id,
            ..
        }
        | SocialEvent::ReplyCreated {
            post_id,
            post_author_id,
            ..
        } => (post_author_id, Verb::Comment, Some(post_id)),
        SocialEvent::FollowRemoved { .. } | SocialEvent::LikeRemoved { .. } => return None,
    };

    let actor = event.actor_id();
    if actor == recipient {
        debug!("Skipping self-targeted {} notification for {}", verb, actor);
        return None;
    }

    notify(db, recipient, verb, Some(actor), post_id)
}

/// Mark one notification read on behalf of its recipient. Repeat calls are
/// harmless.
pub fn mark_read(db: &Database, notification_id: Uuid, requester: Uuid) -> CoreResult<Notification> {
    let mut notification = db
        .get_notification(notification_id)?
        .ok_or(CoreError::NotFound("notification"))?;

    if notification.recipient_id != requester {
        return Err(CoreError::Forbidden(
            "only the recipient can mark a notification read".into(),
        ));
    }

    if !notification.is_read {
        db.set_notification_read(notification_id)?;
        notification.is_read = true;
    }
    Ok(notification)
}

pub fn mark_all_read(db: &Database, user: Uuid) -> CoreResult<usize> {
    Ok(db.mark_all_notifications_read(user)?)
}

/// The user's inbox, newest first.
pub fn list_inbox(db: &Database, user: Uuid) -> CoreResult<Vec<Notification>> {
    Ok(db.list_notifications(user)?)
}

pub fn unread_notification_count(db: &Database, user: Uuid) -> CoreResult<usize> {
    Ok(db.count_unread_notifications(user)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::db_with_users;

    #[test]
    fn follow_like_comment_reply_map_to_verbs() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        let (a, b) = (ids[0], ids[1]);
        let post = Uuid::new_v4();

        let events = [
            SocialEvent::FollowCreated { follower_id: a, followed_id: b },
            SocialEvent::LikeCreated { liker_id: a, post_id: post, post_author_id: b },
            SocialEvent::CommentCreated { commenter_id: a, post_id: post, post_author_id: b },
            SocialEvent::ReplyCreated { replier_id: a, post_id: post, post_author_id: b },
        ];
        let verbs: Vec<Verb> = events
            .iter()
            .map(|e| dispatch(&db, e).unwrap())
            .map(|n| {
                assert_eq!(n.recipient_id, b);
                assert_eq!(n.actor_id, Some(a));
                n.verb
            })
            .collect();

        assert_eq!(verbs, vec![Verb::Follow, Verb::Like, Verb::Comment, Verb::Comment]);
        assert_eq!(list_inbox(&db, b).unwrap().len(), 4);
        assert!(list_inbox(&db, a).unwrap().is_empty());
    }

    #[test]
    fn removals_and_self_actions_are_silent() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        let (a, b) = (ids[0], ids[1]);
        let post = Uuid::new_v4();

        assert!(dispatch(&db, &SocialEvent::FollowRemoved { follower_id: a, followed_id: b }).is_none());
        assert!(dispatch(&db, &SocialEvent::LikeRemoved { liker_id: a, post_id: post }).is_none());
        assert!(
            dispatch(&db, &SocialEvent::LikeCreated { liker_id: b, post_id: post, post_author_id: b })
                .is_none()
        );
        assert!(
            dispatch(&db, &SocialEvent::ReplyCreated { replier_id: b, post_id: post, post_author_id: b })
                .is_none()
        );
        assert!(list_inbox(&db, b).unwrap().is_empty());
    }

    #[test]
    fn store_failure_is_swallowed() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        db.with_conn(|conn| Ok(conn.execute_batch("DROP TABLE notifications")?))
            .unwrap();

        let n = notify(&db, ids[1], Verb::Follow, Some(ids[0]), None);
        assert!(n.is_none());
    }

    #[test]
    fn inbox_is_newest_first() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        let first = notify(&db, ids[1], Verb::Follow, Some(ids[0]), None).unwrap();
        let second = notify(&db, ids[1], Verb::Like, Some(ids[0]), Some(Uuid::new_v4())).unwrap();

        let inbox = list_inbox(&db, ids[1]).unwrap();
        assert_eq!(inbox, vec![second, first]);
    }

    #[test]
    fn only_recipient_marks_read() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        let n = notify(&db, ids[1], Verb::Follow, Some(ids[0]), None).unwrap();

        assert!(matches!(mark_read(&db, n.id, ids[0]), Err(CoreError::Forbidden(_))));
        assert!(!db.get_notification(n.id).unwrap().unwrap().is_read);

        assert!(mark_read(&db, n.id, ids[1]).unwrap().is_read);
        assert!(mark_read(&db, n.id, ids[1]).unwrap().is_read);
        assert_eq!(unread_notification_count(&db, ids[1]).unwrap(), 0);
    }

    #[test]
    fn missing_notification_is_not_found() {
        let (db, ids) = db_with_users(&["alice"]);
        assert!(matches!(
            mark_read(&db, Uuid::new_v4(), ids[0]),
            Err(CoreError::NotFound("notification"))
        ));
    }

    #[test]
    fn mark_all_read_reports_changed_rows() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        notify(&db, ids[1], Verb::Follow, Some(ids[0]), None).unwrap();
        notify(&db, ids[1], Verb::Like, Some(ids[0]), None).unwrap();
        notify(&db, ids[0], Verb::Follow, Some(ids[1]), None).unwrap();

        assert_eq!(unread_notification_count(&db, ids[1]).unwrap(), 2);
        assert_eq!(mark_all_read(&db, ids[1]).unwrap(), 2);
        assert_eq!(mark_all_read(&db, ids[1]).unwrap(), 0);
        assert_eq!(unread_notification_count(&db, ids[0]).unwrap(), 1);
    }

    #[test]
    fn deleted_actor_leaves_anonymous_notification() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        let n = notify(&db, ids[1], Verb::Follow, Some(ids[0]), None).unwrap();

        assert!(db.delete_user(ids[0]).unwrap());

        let stored = db.get_notification(n.id).unwrap().unwrap();
        assert_eq!(stored.actor_id, None);
        assert_eq!(stored.recipient_id, ids[1]);
    }
}
