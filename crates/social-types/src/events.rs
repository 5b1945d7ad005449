use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Social actions emitted by the follow graph and the post/comment store.
/// The notification dispatcher reacts to the `*Created` variants only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SocialEvent {
    /// A new follow edge was created
    FollowCreated { follower_id: Uuid, followed_id: Uuid },

    /// A follow edge was removed
    FollowRemoved { follower_id: Uuid, followed_id: Uuid },

    /// A user liked a post
    LikeCreated {
        liker_id: Uuid,
        post_id: Uuid,
        post_author_id: Uuid,
    },

    /// A user took back a like
    LikeRemoved { liker_id: Uuid, post_id: Uuid },

    /// A top-level comment was added to a post
    CommentCreated {
        commenter_id: Uuid,
        post_id: Uuid,
        post_author_id: Uuid,
    },

    /// A reply was added under an existing comment.
    /// `post_author_id` is the author of the root post, not of the parent comment.
    ReplyCreated {
        replier_id: Uuid,
        post_id: Uuid,
        post_author_id: Uuid,
    },
}

impl SocialEvent {
    /// The user who performed the action.
    pub fn actor_id(&self) -> Uuid {
        match self {
            Self::FollowCreated { follower_id, .. } | Self::FollowRemoved { follower_id, .. } => {
                *follower_id
            }
            Self::LikeCreated { liker_id, .. } | Self::LikeRemoved { liker_id, .. } => *liker_id,
            Self::CommentCreated { commenter_id, .. } => *commenter_id,
            Self::ReplyCreated { replier_id, .. } => *replier_id,
        }
    }
}
