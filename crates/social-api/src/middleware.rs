use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use social_core::CoreResult;
use social_db::Database;
use tracing::error;

use social_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;

/// Resolve an `Authorization` header value to the caller's claims.
/// `None` for a missing scheme, a bad signature or an expired token.
pub fn authenticate(auth_header: &str, secret: &str) -> Option<Claims> {
    let token = auth_header.strip_prefix("Bearer ")?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

/// Extract and validate JWT from Authorization header.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let claims = authenticate(auth_header, &state.jwt_secret).ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Run a core operation off the async runtime.
pub(crate) async fn blocking<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> CoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal
        })?
        .map_err(ApiError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::create_token;
    use uuid::Uuid;

    #[test]
    fn accepts_own_tokens_only() {
        let user = Uuid::new_v4();
        let token = create_token("secret-a", user, "alice").unwrap();

        let claims = authenticate(&format!("Bearer {}", token), "secret-a").unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.username, "alice");

        assert!(authenticate(&format!("Bearer {}", token), "secret-b").is_none());
        assert!(authenticate(&token, "secret-a").is_none());
    }
}
