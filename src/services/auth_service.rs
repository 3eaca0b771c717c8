//! Domain service for registration and authentication.
//!
//! Login trades a verified username/password pair for a stateless session
//! credential; registration stores a salted Argon2id digest, never the
//! password itself.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Username or email already exists")]
    Conflict,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub username: String,
    pub email: String,
}

/// Login result: the session credential plus the user it identifies.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub token: String,
    pub user: UserInfo,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] if the username or email is taken.
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<UserInfo, AuthError>;

    /// Verifies credentials and issues a session credential.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if the username is unknown
    /// or the password does not match.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;
}
