use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::{error, info};
use uuid::Uuid;

use social_db::Database;
use social_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::BadRequest("username must be 3 to 32 characters".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::BadRequest("password must be at least 8 characters".into()));
    }

    let db = state.clone();
    let username = req.username.clone();
    let user_id = tokio::task::spawn_blocking(move || -> Result<Uuid, ApiError> {
        // Check if username is taken
        if db.db.get_user_by_username(&username)?.is_some() {
            return Err(ApiError::Conflict("username is taken".into()));
        }

        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| {
                error!("Password hashing failed: {}", e);
                ApiError::Internal
            })?
            .to_string();

        create_account(&db.db, &username, &password_hash)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })??;

    info!("Registered user {} ({})", req.username, user_id);

    let token = create_token(&state.jwt_secret, user_id, &req.username).map_err(|e| {
        error!("Token encoding failed: {}", e);
        ApiError::Internal
    })?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let (user_id, username) = tokio::task::spawn_blocking(move || -> Result<(Uuid, String), ApiError> {
        let user = db
            .db
            .get_user_by_username(&req.username)?
            .ok_or(ApiError::Unauthorized)?;

        // Verify password
        let parsed_hash = PasswordHash::new(&user.password).map_err(|_| ApiError::Internal)?;
        Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed_hash)
            .map_err(|_| ApiError::Unauthorized)?;

        let user_id: Uuid = user.id.parse().map_err(|_| ApiError::Internal)?;
        Ok((user_id, user.username))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })??;

    let token = create_token(&state.jwt_secret, user_id, &username).map_err(|e| {
        error!("Token encoding failed: {}", e);
        ApiError::Internal
    })?;

    Ok(Json(LoginResponse {
        user_id,
        username,
        token,
    }))
}

/// Insert the account. A concurrent registration that claimed the name
/// between the availability check and this insert loses with a conflict.
fn create_account(db: &Database, username: &str, password_hash: &str) -> Result<Uuid, ApiError> {
    let user_id = Uuid::new_v4();
    match db.create_user(user_id, username, password_hash) {
        Ok(_) => Ok(user_id),
        Err(e) if social_db::is_conflict(&e) => Err(ApiError::Conflict("username is taken".into())),
        Err(e) => Err(e.into()),
    }
}

/// Issue a 30-day bearer token for `user_id`.
pub fn create_token(secret: &str, user_id: Uuid, username: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
