use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::{self, AppState};
use crate::middleware::require_auth;
use crate::{notifications, posts, threads, users};

/// Every HTTP route, with bearer authentication on everything but `/auth/*`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        // Users & follows
        .route("/users/{user_id}", get(users::get_profile))
        .route("/users/{user_id}/follow", post(users::toggle_follow))
        .route("/users/{user_id}/followers", get(users::list_followers))
        .route("/users/{user_id}/following", get(users::list_following))
        // Posts, likes, comments
        .route("/feed", get(posts::get_feed))
        .route("/posts", post(posts::create_post))
        .route("/posts/{post_id}", get(posts::get_post))
        .route("/posts/{post_id}/like", post(posts::toggle_like))
        .route("/posts/{post_id}/comments", post(posts::add_comment))
        .route("/comments/{comment_id}/replies", post(posts::add_reply))
        // Direct messages
        .route("/threads", get(threads::list_threads).post(threads::open_thread))
        .route("/threads/{thread_id}", get(threads::view_thread))
        .route("/threads/{thread_id}/messages", post(threads::send_message))
        .route("/messages/unread", get(threads::unread_messages))
        // Notifications
        .route("/notifications", get(notifications::list_notifications))
        .route("/notifications/unread", get(notifications::unread_notifications))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{notification_id}/read", post(notifications::mark_read))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
