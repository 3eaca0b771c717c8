use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{HeaderMap, header, request::Parts},
};
use serde::Deserialize;
use std::sync::Arc;

use super::validation::{validate_email, validate_password, validate_username};
use super::{ApiError, ApiResponse, AppState};
use crate::services::{LoginResult, UserInfo};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Session Extraction
// ============================================================================

/// Interactive caller identity, proven by the signed session credential in
/// the `Authorization: Bearer` header. Extracting this is the session
/// validation path; token-path routes read the header themselves instead.
pub struct SessionUser {
    pub user_id: i32,
}

impl FromRequestParts<Arc<AppState>> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing or invalid authorization header"))?;

        let user_id = state
            .sessions()
            .verify(token)
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

        tracing::Span::current().record("user_id", user_id);

        Ok(Self { user_id })
    }
}

/// Pulls the bearer value out of the `Authorization` header.
pub(super) fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Create a new user account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<ApiResponse<UserInfo>>, ApiError> {
    let username = validate_username(&payload.username)?;
    let email = validate_email(&payload.email)?;
    let password = validate_password(&payload.password)?;

    let user = state
        .auth_service()
        .register(username, email, password)
        .await?;

    Ok(Json(ApiResponse::success(user)))
}

/// POST /auth/login
/// Authenticate with username and password; returns a 24-hour session
/// credential on success.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResult>>, ApiError> {
    if payload.username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(ApiError::validation("Password is required"));
    }

    let result = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;

    tracing::info!("User logged in: {}", result.user.username);

    Ok(Json(ApiResponse::success(result)))
}
