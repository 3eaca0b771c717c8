use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;

use crate::domain::Role;
use crate::entities::{project_permissions, projects};

pub struct ProjectRepository {
    conn: DatabaseConnection,
}

impl ProjectRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Creates a project and the owner's admin permission row in one
    /// transaction. A failure in either insert rolls back both, so no
    /// project ever exists without an admin.
    pub async fn create_with_owner(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: i32,
    ) -> Result<projects::Model> {
        let txn = self
            .conn
            .begin()
            .await
            .context("Failed to open transaction for project creation")?;

        let now = chrono::Utc::now().to_rfc3339();

        let project = projects::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.map(ToString::to_string)),
            owner_id: Set(owner_id),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to insert project")?;

        project_permissions::ActiveModel {
            user_id: Set(owner_id),
            project_id: Set(project.id),
            role: Set(Role::Admin.as_str().to_string()),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to grant owner admin role")?;

        txn.commit()
            .await
            .context("Failed to commit project creation")?;

        Ok(project)
    }

    /// All projects the user holds a permission row on, with the role.
    pub async fn list_for_user(&self, user_id: i32) -> Result<Vec<(projects::Model, Role)>> {
        let permissions = project_permissions::Entity::find()
            .filter(project_permissions::Column::UserId.eq(user_id))
            .all(&self.conn)
            .await
            .context("Failed to query project permissions")?;

        if permissions.is_empty() {
            return Ok(vec![]);
        }

        let roles: HashMap<i32, Role> = permissions
            .iter()
            .filter_map(|p| Role::parse(&p.role).map(|role| (p.project_id, role)))
            .collect();

        let project_ids: Vec<i32> = roles.keys().copied().collect();
        let rows = projects::Entity::find()
            .filter(projects::Column::Id.is_in(project_ids))
            .order_by_asc(projects::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to query projects")?;

        Ok(rows
            .into_iter()
            .filter_map(|project| roles.get(&project.id).map(|role| (project, *role)))
            .collect())
    }

    /// Single permission lookup; absence (or an unparseable stored role)
    /// means no access.
    pub async fn role_of(&self, user_id: i32, project_id: i32) -> Result<Option<Role>> {
        let permission = project_permissions::Entity::find()
            .filter(project_permissions::Column::UserId.eq(user_id))
            .filter(project_permissions::Column::ProjectId.eq(project_id))
            .one(&self.conn)
            .await
            .context("Failed to query project permission")?;

        Ok(permission.and_then(|p| Role::parse(&p.role)))
    }
}
