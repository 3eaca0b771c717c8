use axum::{Json, extract::State};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::SessionUser;
use super::validation::validate_project_name;
use super::{ApiError, ApiResponse, AppState, ProjectDto};
use crate::domain::Role;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub description: Option<String>,
}

/// POST /projects
/// Create a project; the creator becomes its first admin in the same
/// transaction.
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
    Json(payload): Json<CreateProjectRequest>,
) -> Result<Json<ApiResponse<ProjectDto>>, ApiError> {
    let name = validate_project_name(&payload.name)?;

    let project = state
        .store()
        .create_project_with_owner(name, payload.description.as_deref(), user.user_id)
        .await?;

    tracing::info!("Project '{}' created by user {}", project.name, user.user_id);

    Ok(Json(ApiResponse::success(ProjectDto::from_model(
        project,
        Role::Admin,
    ))))
}

/// GET /projects
/// All projects the caller holds a role on.
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    user: SessionUser,
) -> Result<Json<ApiResponse<Vec<ProjectDto>>>, ApiError> {
    let projects = state.store().list_projects_for_user(user.user_id).await?;

    let dtos: Vec<ProjectDto> = projects
        .into_iter()
        .map(|(project, role)| ProjectDto::from_model(project, role))
        .collect();

    Ok(Json(ApiResponse::success(dtos)))
}
