//! `SeaORM` implementation of the `AuthService` trait.

use std::sync::Arc;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::db::repositories::user::is_unique_violation;
use crate::services::auth_service::{AuthError, AuthService, LoginResult, UserInfo};
use crate::services::session::SessionKeys;
use async_trait::async_trait;

pub struct SeaOrmAuthService {
    store: Store,
    sessions: Arc<SessionKeys>,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, sessions: Arc<SessionKeys>, security: SecurityConfig) -> Self {
        Self {
            store,
            sessions,
            security,
        }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .create_user(username, email, password, &self.security)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AuthError::Conflict
                } else {
                    AuthError::from(e)
                }
            })?;

        tracing::info!("Registered user: {}", user.username);

        Ok(UserInfo {
            id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let user = self
            .store
            .verify_user_password(username, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self
            .sessions
            .issue(user.id)
            .map_err(|e| AuthError::Internal(format!("Failed to sign session credential: {e}")))?;

        Ok(LoginResult {
            token,
            user: UserInfo {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        })
    }
}
