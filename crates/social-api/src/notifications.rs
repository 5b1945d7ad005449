use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

use social_core::notify;
use social_types::api::{Claims, UnreadCountResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::blocking;

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let inbox = blocking(&state, move |db| notify::list_inbox(db, claims.sub)).await?;
    Ok(Json(inbox))
}

pub async fn unread_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let unread_count =
        blocking(&state, move |db| notify::unread_notification_count(db, claims.sub)).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let notification =
        blocking(&state, move |db| notify::mark_read(db, notification_id, claims.sub)).await?;
    Ok(Json(notification))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let marked = blocking(&state, move |db| notify::mark_all_read(db, claims.sub)).await?;
    Ok(Json(json!({ "marked": marked })))
}
