//! Post, like and comment actions. Each successful creation hands a
//! [`SocialEvent`] to the notification dispatcher after the action itself
//! has been stored.

use social_db::models::now;
use social_db::{Database, Toggled};
use social_types::api::{FeedPost, FeedScope, LikeOutcome, PostDetail};
use social_types::events::SocialEvent;
use social_types::models::{Comment, Post};
use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::notify;
use crate::text::{MAX_COMMENT_CHARS, MAX_POST_CHARS, clean};

fn load_post(db: &Database, post_id: Uuid) -> CoreResult<Post> {
    db.get_post(post_id)?.ok_or(CoreError::NotFound("post"))
}

pub fn create_post(db: &Database, author: Uuid, text: &str) -> CoreResult<Post> {
    let text = clean("post", text, MAX_POST_CHARS)?;
    let post = Post {
        id: Uuid::new_v4(),
        author_id: author,
        text,
        created_at: now(),
    };
    db.insert_post(&post)?;

    info!("Post {} created by {}", post.id, author);
    Ok(post)
}

pub fn get_post(db: &Database, post_id: Uuid, viewer: Uuid) -> CoreResult<PostDetail> {
    let post = load_post(db, post_id)?;
    Ok(PostDetail {
        likes_count: db.count_likes(post.id)?,
        liked_by_viewer: db.has_liked(viewer, post.id)?,
        comments: db.list_comments(post.id)?,
        post,
    })
}

pub fn feed(db: &Database, viewer: Uuid, scope: FeedScope) -> CoreResult<Vec<FeedPost>> {
    Ok(db.list_feed(viewer, scope == FeedScope::Following)?)
}

/// Like the post, or take the like back if it already exists.
pub fn toggle_like(db: &Database, user: Uuid, post_id: Uuid) -> CoreResult<LikeOutcome> {
    let post = load_post(db, post_id)?;

    let liked = match db.toggle_like(user, post.id)? {
        Toggled::Created => {
            notify::dispatch(
                db,
                &SocialEvent::LikeCreated {
                    liker_id: user,
                    post_id: post.id,
                    post_author_id: post.author_id,
                },
            );
            true
        }
        Toggled::Removed => {
            notify::dispatch(
                db,
                &SocialEvent::LikeRemoved {
                    liker_id: user,
                    post_id: post.id,
                },
            );
            false
        }
        Toggled::AlreadyPresent => true,
    };

    Ok(LikeOutcome {
        liked,
        likes_count: db.count_likes(post.id)?,
    })
}

/// Top-level comment on a post.
pub fn add_comment(db: &Database, author: Uuid, post_id: Uuid, text: &str) -> CoreResult<Comment> {
    let post = load_post(db, post_id)?;
    let text = clean("comment", text, MAX_COMMENT_CHARS)?;

    let comment = Comment {
        id: Uuid::new_v4(),
        post_id: post.id,
        author_id: author,
        parent_id: None,
        text,
        created_at: now(),
    };
    db.insert_comment(&comment)?;
    info!("Comment {} on post {} by {}", comment.id, post.id, author);

    notify::dispatch(
        db,
        &SocialEvent::CommentCreated {
            commenter_id: author,
            post_id: post.id,
            post_author_id: post.author_id,
        },
    );
    Ok(comment)
}

/// Reply under an existing comment. The reply belongs to the parent's post
/// and the post's author is the one notified.
pub fn add_reply(db: &Database, author: Uuid, parent_id: Uuid, text: &str) -> CoreResult<Comment> {
    let parent = db
        .get_comment(parent_id)?
        .ok_or(CoreError::NotFound("comment"))?;
    let post = load_post(db, parent.post_id)?;
    let text = clean("reply", text, MAX_COMMENT_CHARS)?;

    let reply = Comment {
        id: Uuid::new_v4(),
        post_id: post.id,
        author_id: author,
        parent_id: Some(parent.id),
        text,
        created_at: now(),
    };
    db.insert_comment(&reply)?;
    info!("Reply {} to comment {} by {}", reply.id, parent.id, author);

    notify::dispatch(
        db,
        &SocialEvent::ReplyCreated {
            replier_id: author,
            post_id: post.id,
            post_author_id: post.author_id,
        },
    );
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::toggle_follow;
    use crate::notify::list_inbox;
    use crate::testing::db_with_users;
    use social_types::models::Verb;

    fn break_notifications(db: &Database) {
        db.with_conn(|conn| Ok(conn.execute_batch("DROP TABLE notifications")?))
            .unwrap();
    }

    #[test]
    fn liking_someone_elses_post_notifies_once() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        let (a, b) = (ids[0], ids[1]);
        let post = create_post(&db, b, "hello").unwrap();

        let outcome = toggle_like(&db, a, post.id).unwrap();
        assert_eq!(outcome, LikeOutcome { liked: true, likes_count: 1 });

        let inbox = list_inbox(&db, b).unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].verb, Verb::Like);
        assert_eq!(inbox[0].actor_id, Some(a));
        assert_eq!(inbox[0].post_id, Some(post.id));
    }

    #[test]
    fn liking_own_post_is_silent() {
        let (db, ids) = db_with_users(&["bob"]);
        let post = create_post(&db, ids[0], "mine").unwrap();
        assert!(toggle_like(&db, ids[0], post.id).unwrap().liked);
        assert!(list_inbox(&db, ids[0]).unwrap().is_empty());
    }

    #[test]
    fn unlike_is_silent_and_relike_notifies_fresh() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        let (a, b) = (ids[0], ids[1]);
        let post = create_post(&db, b, "hello").unwrap();

        toggle_like(&db, a, post.id).unwrap();
        let removed = toggle_like(&db, a, post.id).unwrap();
        assert_eq!(removed, LikeOutcome { liked: false, likes_count: 0 });
        assert_eq!(list_inbox(&db, b).unwrap().len(), 1);

        toggle_like(&db, a, post.id).unwrap();
        let inbox = list_inbox(&db, b).unwrap();
        assert_eq!(inbox.len(), 2);
        assert_ne!(inbox[0].id, inbox[1].id);
        assert_eq!(db.count_likes(post.id).unwrap(), 1);
    }

    #[test]
    fn comment_and_reply_notify_post_author_only() {
        let (db, ids) = db_with_users(&["alice", "bob", "carol"]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        let post = create_post(&db, b, "hello").unwrap();

        let comment = add_comment(&db, a, post.id, "nice").unwrap();
        let reply = add_reply(&db, c, comment.id, "agreed").unwrap();
        assert_eq!(reply.post_id, post.id);
        assert_eq!(reply.parent_id, Some(comment.id));
        assert!(reply.is_reply());

        let inbox = list_inbox(&db, b).unwrap();
        assert_eq!(inbox.len(), 2);
        assert!(inbox.iter().all(|n| n.verb == Verb::Comment));
        assert_eq!(inbox[0].actor_id, Some(c));
        assert_eq!(inbox[1].actor_id, Some(a));

        // The parent comment's author is not notified about the reply.
        assert!(list_inbox(&db, a).unwrap().is_empty());
        assert!(list_inbox(&db, c).unwrap().is_empty());
    }

    #[test]
    fn author_commenting_on_own_post_is_silent() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        let (a, b) = (ids[0], ids[1]);
        let post = create_post(&db, b, "hello").unwrap();
        let comment = add_comment(&db, a, post.id, "hi").unwrap();
        add_reply(&db, b, comment.id, "thanks").unwrap();
        add_comment(&db, b, post.id, "bump").unwrap();

        assert_eq!(list_inbox(&db, b).unwrap().len(), 1);
    }

    #[test]
    fn actions_succeed_when_notifications_fail() {
        let (db, ids) = db_with_users(&["alice", "bob"]);
        let (a, b) = (ids[0], ids[1]);
        let post = create_post(&db, b, "hello").unwrap();
        break_notifications(&db);

        assert!(toggle_like(&db, a, post.id).unwrap().liked);
        let comment = add_comment(&db, a, post.id, "nice").unwrap();
        add_reply(&db, a, comment.id, "really").unwrap();

        let detail = get_post(&db, post.id, a).unwrap();
        assert_eq!(detail.likes_count, 1);
        assert!(detail.liked_by_viewer);
        assert_eq!(detail.comments.len(), 2);
    }

    #[test]
    fn validation_and_lookup_errors() {
        let (db, ids) = db_with_users(&["alice"]);
        assert!(matches!(create_post(&db, ids[0], ""), Err(CoreError::Validation(_))));
        assert!(matches!(
            create_post(&db, ids[0], &"x".repeat(MAX_POST_CHARS + 1)),
            Err(CoreError::Validation(_))
        ));
        assert!(matches!(
            toggle_like(&db, ids[0], Uuid::new_v4()),
            Err(CoreError::NotFound("post"))
        ));
        assert!(matches!(
            add_reply(&db, ids[0], Uuid::new_v4(), "hi"),
            Err(CoreError::NotFound("comment"))
        ));

        let post = create_post(&db, ids[0], "ok").unwrap();
        assert!(matches!(
            add_comment(&db, ids[0], post.id, &"x".repeat(MAX_COMMENT_CHARS + 1)),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn following_feed_only_shows_followed_authors() {
        let (db, ids) = db_with_users(&["alice", "bob", "carol"]);
        let (a, b, c) = (ids[0], ids[1], ids[2]);
        let from_b = create_post(&db, b, "from bob").unwrap();
        let from_c = create_post(&db, c, "from carol").unwrap();
        toggle_follow(&db, a, b).unwrap();
        toggle_like(&db, a, from_b.id).unwrap();

        let all = feed(&db, a, FeedScope::All).unwrap();
        let all_ids: Vec<Uuid> = all.iter().map(|f| f.post.id).collect();
        assert_eq!(all_ids, vec![from_c.id, from_b.id]);

        let followed = feed(&db, a, FeedScope::Following).unwrap();
        assert_eq!(followed.len(), 1);
        assert_eq!(followed[0].post.id, from_b.id);
        assert_eq!(followed[0].likes_count, 1);
        assert!(followed[0].liked_by_viewer);
    }
}
