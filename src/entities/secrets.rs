use sea_orm::entity::prelude::*;

/// Secret key/value pair. `value` holds the AES-GCM ciphertext (base64);
/// plaintext never reaches this table. `(project_id, key)` is unique via a
/// composite index in the initial migration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "secrets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub project_id: i32,

    pub key: String,

    pub value: String,

    pub description: Option<String>,

    pub created_by: i32,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
