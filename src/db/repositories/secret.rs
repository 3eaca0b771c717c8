use anyhow::{Context, Result, anyhow};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entities::secrets;

pub struct SecretRepository {
    conn: DatabaseConnection,
}

impl SecretRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Atomic insert-or-update keyed on `(project_id, key)`: one
    /// `ON CONFLICT` statement, never read-then-write, so concurrent writers
    /// to the same key cannot interleave. An existing row keeps its
    /// `created_at`/`created_by` while value, description and `updated_at`
    /// are replaced.
    pub async fn upsert(
        &self,
        project_id: i32,
        key: &str,
        encrypted_value: &str,
        description: Option<&str>,
        created_by: i32,
    ) -> Result<secrets::Model> {
        let now = chrono::Utc::now().to_rfc3339();

        let model = secrets::ActiveModel {
            project_id: Set(project_id),
            key: Set(key.to_string()),
            value: Set(encrypted_value.to_string()),
            description: Set(description.map(ToString::to_string)),
            created_by: Set(created_by),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        secrets::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    secrets::Column::ProjectId,
                    secrets::Column::Key,
                ])
                .update_columns([
                    secrets::Column::Value,
                    secrets::Column::Description,
                    secrets::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.conn)
            .await
            .context("Failed to upsert secret")?;

        secrets::Entity::find()
            .filter(secrets::Column::ProjectId.eq(project_id))
            .filter(secrets::Column::Key.eq(key))
            .one(&self.conn)
            .await
            .context("Failed to read back upserted secret")?
            .ok_or_else(|| anyhow!("Secret row missing after upsert"))
    }

    pub async fn list_for_project(&self, project_id: i32) -> Result<Vec<secrets::Model>> {
        let rows = secrets::Entity::find()
            .filter(secrets::Column::ProjectId.eq(project_id))
            .order_by_asc(secrets::Column::Key)
            .all(&self.conn)
            .await
            .context("Failed to list secrets")?;

        Ok(rows)
    }
}
