use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::entities::access_tokens;

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        token: &str,
        user_id: i32,
        project_id: i32,
        name: &str,
        expires_at: Option<String>,
    ) -> Result<access_tokens::Model> {
        let model = access_tokens::ActiveModel {
            token: Set(token.to_string()),
            user_id: Set(user_id),
            project_id: Set(project_id),
            name: Set(name.to_string()),
            expires_at: Set(expires_at),
            last_used_at: Set(None),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let inserted = model
            .insert(&self.conn)
            .await
            .context("Failed to insert access token")?;

        Ok(inserted)
    }

    /// O(1) lookup by value through the unique token index.
    pub async fn find_by_token(&self, token: &str) -> Result<Option<access_tokens::Model>> {
        let record = access_tokens::Entity::find()
            .filter(access_tokens::Column::Token.eq(token))
            .one(&self.conn)
            .await
            .context("Failed to query access token")?;

        Ok(record)
    }

    /// Records a use of the token. Best-effort telemetry, called from a
    /// detached task; a lost update under concurrency is acceptable.
    pub async fn touch_last_used(&self, id: i32) -> Result<()> {
        let Some(record) = access_tokens::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query access token for touch")?
        else {
            return Ok(());
        };

        let mut active: access_tokens::ActiveModel = record.into();
        active.last_used_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        active.update(&self.conn).await?;

        Ok(())
    }

    /// Deletes tokens whose absolute expiry has passed. RFC 3339 UTC strings
    /// compare lexicographically in timestamp order.
    pub async fn prune_expired(&self, now: &str) -> Result<u64> {
        let result = access_tokens::Entity::delete_many()
            .filter(access_tokens::Column::ExpiresAt.is_not_null())
            .filter(access_tokens::Column::ExpiresAt.lt(now))
            .exec(&self.conn)
            .await
            .context("Failed to prune expired access tokens")?;

        Ok(result.rows_affected)
    }
}
