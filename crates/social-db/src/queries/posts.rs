use anyhow::Result;
use rusqlite::{Row, TransactionBehavior};
use social_types::api::FeedPost;
use social_types::models::{Comment, Post};
use uuid::Uuid;

use super::{OptionalExt, is_unique_violation};
use crate::Database;
use crate::models::{Toggled, count_at, format_ts, now, opt_uuid_at, ts_at, uuid_at};

impl Database {
    // -- Posts --

    pub fn insert_post(&self, post: &Post) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (id, author_id, text, created_at) VALUES (?1, ?2, ?3, ?4)",
                (
                    post.id.to_string(),
                    post.author_id.to_string(),
                    &post.text,
                    format_ts(&post.created_at),
                ),
            )?;
            Ok(())
        })
    }

    pub fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, author_id, text, created_at FROM posts WHERE id = ?1",
                [id.to_string()],
                post_from_row,
            )
            .optional()
        })
    }

    /// Newest posts first, optionally restricted to authors `viewer_id` follows.
    pub fn list_feed(&self, viewer_id: Uuid, following_only: bool) -> Result<Vec<FeedPost>> {
        let filter = if following_only {
            "WHERE p.author_id IN (SELECT following_id FROM follows WHERE follower_id = ?1)"
        } else {
            ""
        };
        let sql = format!(
            "SELECT p.id, p.author_id, p.text, p.created_at,
                    (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id),
                    EXISTS(SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = ?1)
             FROM posts p
             {}
             ORDER BY p.created_at DESC, p.rowid DESC",
            filter
        );

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([viewer_id.to_string()], |row| {
                    Ok(FeedPost {
                        post: post_from_row(row)?,
                        likes_count: count_at(row, 4)?,
                        liked_by_viewer: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Likes --

    /// Like the post if the user has not, otherwise take the like back.
    /// `UNIQUE(user_id, post_id)` keeps a double submit from creating two rows.
    pub fn toggle_like(&self, user_id: Uuid, post_id: Uuid) -> Result<Toggled> {
        let user = user_id.to_string();
        let post = post_id.to_string();

        self.with_conn_mut(|conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let removed = tx.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2",
                [&user, &post],
            )?;

            let outcome = if removed > 0 {
                Toggled::Removed
            } else {
                match tx.execute(
                    "INSERT INTO likes (user_id, post_id, created_at) VALUES (?1, ?2, ?3)",
                    [&user, &post, &format_ts(&now())],
                ) {
                    Ok(_) => Toggled::Created,
                    Err(e) if is_unique_violation(&e) => Toggled::AlreadyPresent,
                    Err(e) => return Err(e.into()),
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
    }

    pub fn count_likes(&self, post_id: Uuid) -> Result<usize> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM likes WHERE post_id = ?1",
                [post_id.to_string()],
                |row| count_at(row, 0),
            )?;
            Ok(n)
        })
    }

    pub fn has_liked(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let found: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = ?1 AND post_id = ?2)",
                [user_id.to_string(), post_id.to_string()],
                |row| row.get(0),
            )?;
            Ok(found)
        })
    }

    // -- Comments --

    pub fn insert_comment(&self, comment: &Comment) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, post_id, author_id, parent_id, text, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                (
                    comment.id.to_string(),
                    comment.post_id.to_string(),
                    comment.author_id.to_string(),
                    comment.parent_id.map(|p| p.to_string()),
                    &comment.text,
                    format_ts(&comment.created_at),
                ),
            )?;
            Ok(())
        })
    }

    pub fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, post_id, author_id, parent_id, text, created_at
                 FROM comments WHERE id = ?1",
                [id.to_string()],
                comment_from_row,
            )
            .optional()
        })
    }

    /// Every comment and reply on a post, oldest first.
    pub fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, post_id, author_id, parent_id, text, created_at
                 FROM comments
                 WHERE post_id = ?1
                 ORDER BY created_at ASC, rowid ASC",
            )?;
            let rows = stmt
                .query_map([post_id.to_string()], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: uuid_at(row, 0)?,
        author_id: uuid_at(row, 1)?,
        text: row.get(2)?,
        created_at: ts_at(row, 3)?,
    })
}

fn comment_from_row(row: &Row<'_>) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: uuid_at(row, 0)?,
        post_id: uuid_at(row, 1)?,
        author_id: uuid_at(row, 2)?,
        parent_id: opt_uuid_at(row, 3)?,
        text: row.get(4)?,
        created_at: ts_at(row, 5)?,
    })
}
