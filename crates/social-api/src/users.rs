use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use social_core::graph;
use social_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::blocking;

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = blocking(&state, move |db| graph::profile(db, user_id, claims.sub)).await?;
    Ok(Json(profile))
}

/// POST /users/{user_id}/follow: follow, or unfollow when already following.
pub async fn toggle_follow(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = blocking(&state, move |db| graph::toggle_follow(db, claims.sub, user_id)).await?;
    Ok(Json(outcome))
}

pub async fn list_followers(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let followers = blocking(&state, move |db| graph::followers(db, user_id)).await?;
    Ok(Json(followers))
}

pub async fn list_following(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(_claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let following = blocking(&state, move |db| graph::following(db, user_id)).await?;
    Ok(Json(following))
}
