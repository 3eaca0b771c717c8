use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::domain::Role;
use crate::entities::{access_tokens, projects, secrets};

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        let is_memory = db_url.contains(":memory:");
        if !is_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        if is_memory {
            // every pooled connection to :memory: is a distinct database
            opt.max_connections(1).min_connections(1);
        } else {
            opt.max_connections(max_connections)
                .min_connections(min_connections);
        }
        opt.connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn project_repo(&self) -> repositories::project::ProjectRepository {
        repositories::project::ProjectRepository::new(self.conn.clone())
    }

    fn secret_repo(&self) -> repositories::secret::SecretRepository {
        repositories::secret::SecretRepository::new(self.conn.clone())
    }

    fn token_repo(&self) -> repositories::token::TokenRepository {
        repositories::token::TokenRepository::new(self.conn.clone())
    }

    // ========== Users ==========

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        security: &SecurityConfig,
    ) -> Result<User> {
        self.user_repo()
            .create(username, email, password, security)
            .await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn verify_user_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>> {
        self.user_repo().verify_password(username, password).await
    }

    // ========== Projects & permissions ==========

    pub async fn create_project_with_owner(
        &self,
        name: &str,
        description: Option<&str>,
        owner_id: i32,
    ) -> Result<projects::Model> {
        self.project_repo()
            .create_with_owner(name, description, owner_id)
            .await
    }

    pub async fn list_projects_for_user(
        &self,
        user_id: i32,
    ) -> Result<Vec<(projects::Model, Role)>> {
        self.project_repo().list_for_user(user_id).await
    }

    pub async fn role_of(&self, user_id: i32, project_id: i32) -> Result<Option<Role>> {
        self.project_repo().role_of(user_id, project_id).await
    }

    // ========== Secrets ==========

    pub async fn upsert_secret(
        &self,
        project_id: i32,
        key: &str,
        encrypted_value: &str,
        description: Option<&str>,
        created_by: i32,
    ) -> Result<secrets::Model> {
        self.secret_repo()
            .upsert(project_id, key, encrypted_value, description, created_by)
            .await
    }

    pub async fn list_secrets(&self, project_id: i32) -> Result<Vec<secrets::Model>> {
        self.secret_repo().list_for_project(project_id).await
    }

    // ========== Access tokens ==========

    pub async fn create_access_token(
        &self,
        token: &str,
        user_id: i32,
        project_id: i32,
        name: &str,
        expires_at: Option<String>,
    ) -> Result<access_tokens::Model> {
        self.token_repo()
            .create(token, user_id, project_id, name, expires_at)
            .await
    }

    pub async fn find_access_token(&self, token: &str) -> Result<Option<access_tokens::Model>> {
        self.token_repo().find_by_token(token).await
    }

    pub async fn touch_access_token(&self, id: i32) -> Result<()> {
        self.token_repo().touch_last_used(id).await
    }

    pub async fn prune_expired_tokens(&self, now: &str) -> Result<u64> {
        self.token_repo().prune_expired(now).await
    }
}
