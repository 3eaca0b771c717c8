use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::auth::{SessionUser, extract_bearer};
use super::validation::validate_secret_key;
use super::{ApiError, ApiResponse, AppState};
use crate::domain::Credential;
use crate::services::SecretMetadata;

#[derive(Debug, Deserialize)]
pub struct UpsertSecretRequest {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

/// POST /projects/{id}/secrets
/// Insert or replace one secret. Requires the write-secret action; returns
/// metadata only; the value never comes back on the write path.
pub async fn upsert_secret(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(project_id): Path<i32>,
    Json(payload): Json<UpsertSecretRequest>,
) -> Result<Json<ApiResponse<SecretMetadata>>, ApiError> {
    let key = validate_secret_key(&payload.key)?;

    let metadata = state
        .secret_service()
        .upsert(
            Credential::Session {
                user_id: user.user_id,
            },
            project_id,
            key,
            &payload.value,
            payload.description.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::success(metadata)))
}

/// GET /projects/{id}/secrets
/// Keys, descriptions and timestamps. The browsing view, no values.
pub async fn list_secret_metadata(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Path(project_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<SecretMetadata>>>, ApiError> {
    let listed = state
        .secret_service()
        .list_metadata(
            Credential::Session {
                user_id: user.user_id,
            },
            project_id,
        )
        .await?;

    Ok(Json(ApiResponse::success(listed)))
}

/// GET /secrets
/// Bulk plaintext resolution for non-interactive clients. The bearer value
/// here is an access token, not a session credential; the token fixes the
/// project scope.
pub async fn resolve_secrets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<BTreeMap<String, String>>>, ApiError> {
    let token = extract_bearer(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing or invalid authorization header"))?;

    let context = state.token_service().validate(token).await?;

    let resolved = state
        .secret_service()
        .resolve_all(
            Credential::ProjectToken {
                project_id: context.project_id,
            },
            context.project_id,
        )
        .await?;

    Ok(Json(ApiResponse::success(resolved)))
}
