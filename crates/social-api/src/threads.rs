use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use social_core::{ledger, threads, unread};
use social_types::api::{Claims, OpenThreadRequest, SendMessageRequest, UnreadCountResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::blocking;

/// GET /threads: the caller's conversations with unread counts.
pub async fn list_threads(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let summaries = blocking(&state, move |db| threads::list_threads_for_user(db, claims.sub)).await?;
    Ok(Json(summaries))
}

/// POST /threads: open (or create) the conversation with another user.
pub async fn open_thread(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<OpenThreadRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let thread = blocking(&state, move |db| {
        threads::open_or_create_thread(db, claims.sub, req.user_id)
    })
    .await?;
    Ok(Json(thread))
}

/// GET /threads/{thread_id}: view a conversation; marks incoming messages read.
pub async fn view_thread(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let view = blocking(&state, move |db| ledger::view_thread(db, thread_id, claims.sub)).await?;
    Ok(Json(view))
}

/// POST /threads/{thread_id}/messages
pub async fn send_message(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = blocking(&state, move |db| {
        ledger::append_message(db, thread_id, claims.sub, &req.text)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// GET /messages/unread: unread incoming messages across all threads.
pub async fn unread_messages(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let unread_count = blocking(&state, move |db| unread::unread_count_global(db, claims.sub)).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}
