use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use social_core::posts;
use social_types::api::{Claims, CreateCommentRequest, CreatePostRequest, FeedQuery};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::blocking;

/// GET /feed?scope=all|following
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let feed = blocking(&state, move |db| posts::feed(db, claims.sub, query.scope)).await?;
    Ok(Json(feed))
}

pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let post = blocking(&state, move |db| posts::create_post(db, claims.sub, &req.text)).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = blocking(&state, move |db| posts::get_post(db, post_id, claims.sub)).await?;
    Ok(Json(detail))
}

/// POST /posts/{post_id}/like: like, or unlike when already liked.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = blocking(&state, move |db| posts::toggle_like(db, claims.sub, post_id)).await?;
    Ok(Json(outcome))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment = blocking(&state, move |db| {
        posts::add_comment(db, claims.sub, post_id, &req.text)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// POST /comments/{comment_id}/replies
pub async fn add_reply(
    State(state): State<AppState>,
    Path(comment_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let reply = blocking(&state, move |db| {
        posts::add_reply(db, claims.sub, comment_id, &req.text)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(reply)))
}
