use sea_orm::entity::prelude::*;

/// Project-scoped bearer token for non-interactive clients.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "access_tokens")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Random 64-char hex string (256 bits of entropy)
    #[sea_orm(unique)]
    pub token: String,

    pub user_id: i32,

    pub project_id: i32,

    pub name: String,

    /// Absolute expiry (RFC 3339); None means the token never expires.
    pub expires_at: Option<String>,

    pub last_used_at: Option<String>,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
