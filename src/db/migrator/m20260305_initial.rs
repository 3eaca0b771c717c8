use crate::entities::prelude::*;
use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Schema;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let schema = Schema::new(backend);

        manager
            .create_table(
                schema
                    .create_table_from_entity(Users)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Projects)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(ProjectPermissions)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(Secrets)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                schema
                    .create_table_from_entity(AccessTokens)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // One permission row per (user, project)
        manager
            .create_index(
                Index::create()
                    .name("idx_project_permissions_user_project")
                    .table(ProjectPermissions)
                    .col(crate::entities::project_permissions::Column::UserId)
                    .col(crate::entities::project_permissions::Column::ProjectId)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Upsert target for secrets: unique (project_id, key)
        manager
            .create_index(
                Index::create()
                    .name("idx_secrets_project_key")
                    .table(Secrets)
                    .col(crate::entities::secrets::Column::ProjectId)
                    .col(crate::entities::secrets::Column::Key)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccessTokens).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Secrets).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProjectPermissions).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users).to_owned())
            .await?;

        Ok(())
    }
}
