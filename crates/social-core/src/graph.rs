//! Identity lookups and the directed follow graph.

use social_db::{Database, Toggled};
use social_types::api::{FollowOutcome, ProfileResponse};
use social_types::events::SocialEvent;
use social_types::models::{Follow, User};
use tracing::info;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::notify;

pub fn user_exists(db: &Database, user: Uuid) -> CoreResult<bool> {
    Ok(db.user_exists(user)?)
}

pub fn get_user(db: &Database, user: Uuid) -> CoreResult<User> {
    db.get_user(user)?.ok_or(CoreError::NotFound("user"))
}

/// Follow `target`, or unfollow if already following. Only a newly created
/// edge notifies the followed user.
pub fn toggle_follow(db: &Database, follower: Uuid, target: Uuid) -> CoreResult<FollowOutcome> {
    if follower == target {
        return Err(CoreError::Validation("you cannot follow yourself".into()));
    }
    if !db.user_exists(target)? {
        return Err(CoreError::NotFound("user"));
    }

    let following = match db.toggle_follow(follower, target)? {
        Toggled::Created => {
            info!("{} followed {}", follower, target);
            notify::dispatch(
                db,
                &SocialEvent::FollowCreated {
                    follower_id: follower,
                    followed_id: target,
                },
            );
            true
        }
        Toggled::Removed => {
            info!("{} unfollowed {}", follower, target);
            notify::dispatch(
                db,
                &SocialEvent::FollowRemoved {
                    follower_id: follower,
                    followed_id: target,
                },
            );
            false
        }
        Toggled::AlreadyPresent => true,
    };

    Ok(FollowOutcome { following })
}

pub fn followers(db: &Database, user: Uuid) -> CoreResult<Vec<Follow>> {
    get_user(db, user)?;
    Ok(db.list_followers(user)?)
}

pub fn following(db: &Database, user: Uuid) -> CoreResult<Vec<Follow>> {
    get_user(db, user)?;
    Ok(db.list_following(user)?)
}

/// (followers, following) for `user`.
pub fn follow_counts(db: &Database, user: Uuid) -> CoreResult<(usize, usize)> {
    Ok(db.follow_counts(user)?)
}

/// Public profile of `user` as seen by `viewer`.
pub fn profile(db: &Database, user: Uuid, viewer: Uuid) -> CoreResult<ProfileResponse> {
    let found = get_user(db, user)?;
    let (followers_count, following_count) = follow_counts(db, user)?;
    let is_following = viewer != user && db.is_following(viewer, user)?;

    Ok(ProfileResponse {
        id: found.id,
        username: found.username,
        followers_count,
        following_count,
        is_following,
    })
}
