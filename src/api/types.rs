use serde::Serialize;

use crate::domain::Role;
use crate::entities::projects;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectDto {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub owner_id: i32,
    /// The caller's role on this project.
    pub role: Role,
    pub created_at: String,
}

impl ProjectDto {
    #[must_use]
    pub fn from_model(project: projects::Model, role: Role) -> Self {
        Self {
            id: project.id,
            name: project.name,
            description: project.description,
            owner_id: project.owner_id,
            role,
            created_at: project.created_at,
        }
    }
}
