use crate::error::ApiError;
use crate::state::AppState;
use axum::http::HeaderMap;
use conclave_core::auth::{ensure_user, verify_token};
use conclave_core::model::User;

/// Resolve the request's bearer token to an application user. A missing
/// auth secret is an infrastructure failure (503), not an invalid
/// credential (401).
pub fn current_user(state: &AppState, headers: &HeaderMap) -> Result<User, ApiError> {
    let authorization = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Authorization header required"))?;

    let mut parts = authorization.split_whitespace();
    let token = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => {
            return Err(ApiError::unauthorized(
                "Invalid authorization header format",
            ))
        }
    };

    let secret = state.server.auth_secret.as_deref().ok_or_else(|| {
        tracing::error!("auth secret not configured, cannot verify tokens");
        ApiError::unavailable("Authentication service temporarily unavailable")
    })?;

    let decoded = verify_token(secret, token)
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired token"))?;

    ensure_user(&state.store, &decoded, &state.server.admin_emails).map_err(ApiError::from)
}
