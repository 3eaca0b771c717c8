use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::SessionUser;
use super::validation::validate_token_name;
use super::{ApiError, ApiResponse, AppState};
use crate::services::IssuedToken;

#[derive(Debug, Deserialize)]
pub struct IssueTokenRequest {
    pub name: String,
    /// Absolute expiry as RFC 3339; omit for a non-expiring token.
    pub expires_at: Option<String>,
}

/// POST /projects/{id}/tokens
/// Mint a project-scoped access token. Admin only; the response is the only
/// place the token value ever appears.
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(project_id): Path<i32>,
    Json(payload): Json<IssueTokenRequest>,
) -> Result<Json<ApiResponse<IssuedToken>>, ApiError> {
    let name = validate_token_name(&payload.name)?;

    let expires_at = payload
        .expires_at
        .as_deref()
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| ApiError::validation("expires_at must be an RFC 3339 timestamp"))
        })
        .transpose()?;

    let issued = state
        .token_service()
        .issue(user.user_id, project_id, name, expires_at)
        .await?;

    Ok(Json(ApiResponse::success(issued)))
}
