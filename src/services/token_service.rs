//! Issuance and validation of project-scoped access tokens.
//!
//! A token is an opaque 256-bit random value handed out exactly once at
//! creation. It is the capability itself: once validated it grants
//! read-only secret resolution on its bound project and nothing else.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::db::Store;
use crate::domain::Action;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Invalid or expired token")]
    Unauthorized,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for TokenError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Full token record returned to the issuer. The only place the plaintext
/// token ever leaves the service; it is not retrievable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub id: i32,
    pub token: String,
    pub name: String,
    pub project_id: i32,
    pub expires_at: Option<String>,
    pub created_at: String,
}

/// What a validated token proves: the scope it is bound to.
#[derive(Debug, Clone, Copy)]
pub struct TokenContext {
    pub project_id: i32,
    pub user_id: i32,
}

pub struct TokenService {
    store: Store,
}

impl TokenService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Mints a token for a project. Only a project admin may do this.
    pub async fn issue(
        &self,
        issuer_user_id: i32,
        project_id: i32,
        name: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<IssuedToken, TokenError> {
        let role = self.store.role_of(issuer_user_id, project_id).await?;
        if !role.is_some_and(|r| r.allows(Action::ManageTokens)) {
            return Err(TokenError::Forbidden);
        }

        if let Some(exp) = expires_at
            && exp <= Utc::now()
        {
            return Err(TokenError::Validation(
                "Expiry must be in the future".to_string(),
            ));
        }

        let token = generate_token();
        let record = self
            .store
            .create_access_token(
                &token,
                issuer_user_id,
                project_id,
                name,
                expires_at.map(|e| e.to_rfc3339()),
            )
            .await?;

        tracing::info!(
            "Issued access token '{}' for project {}",
            record.name,
            record.project_id
        );

        Ok(IssuedToken {
            id: record.id,
            token: record.token,
            name: record.name,
            project_id: record.project_id,
            expires_at: record.expires_at,
            created_at: record.created_at,
        })
    }

    /// Looks up a presented token and checks its absolute expiry. On success
    /// the `last_used_at` touch is spawned off as best-effort telemetry that
    /// must never block or fail the read it accompanies.
    pub async fn validate(&self, token: &str) -> Result<TokenContext, TokenError> {
        let Some(record) = self.store.find_access_token(token).await? else {
            return Err(TokenError::Unauthorized);
        };

        if let Some(raw) = record.expires_at.as_deref() {
            let expires_at = DateTime::parse_from_rfc3339(raw).map_err(|e| {
                TokenError::Internal(format!("Stored token expiry is unreadable: {e}"))
            })?;
            if expires_at <= Utc::now() {
                return Err(TokenError::Unauthorized);
            }
        }

        let store = self.store.clone();
        let token_id = record.id;
        tokio::spawn(async move {
            if let Err(e) = store.touch_access_token(token_id).await {
                tracing::debug!("Failed to update token last_used_at: {e}");
            }
        });

        Ok(TokenContext {
            project_id: record.project_id,
            user_id: record.user_id,
        })
    }
}

/// Generate a random access token (64 character hex string, 256 bits).
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SecurityConfig;

    async fn setup() -> (Store, i32, i32) {
        let store = Store::new("sqlite::memory:").await.unwrap();
        let security = SecurityConfig::default();
        let alice = store
            .create_user("alice", "alice@example.com", "password123", &security)
            .await
            .unwrap();
        let project = store
            .create_project_with_owner("p1", None, alice.id)
            .await
            .unwrap();
        (store, alice.id, project.id)
    }

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(generate_token(), generate_token());
    }

    #[tokio::test]
    async fn test_issue_requires_manage_tokens() {
        let (store, alice, project) = setup().await;
        let service = TokenService::new(store.clone());

        let issued = service.issue(alice, project, "ci", None).await.unwrap();
        assert_eq!(issued.project_id, project);
        assert_eq!(issued.token.len(), 64);

        let bob = store
            .create_user(
                "bob",
                "bob@example.com",
                "password123",
                &SecurityConfig::default(),
            )
            .await
            .unwrap();
        let denied = service.issue(bob.id, project, "nope", None).await;
        assert!(matches!(denied, Err(TokenError::Forbidden)));
    }

    #[tokio::test]
    async fn test_issue_rejects_past_expiry() {
        let (store, alice, project) = setup().await;
        let service = TokenService::new(store);

        let past = Utc::now() - chrono::Duration::hours(1);
        let result = service.issue(alice, project, "stale", Some(past)).await;
        assert!(matches!(result, Err(TokenError::Validation(_))));
    }

    #[tokio::test]
    async fn test_validate_round_trip_and_touch() {
        let (store, alice, project) = setup().await;
        let service = TokenService::new(store.clone());

        let issued = service.issue(alice, project, "ci", None).await.unwrap();
        let context = service.validate(&issued.token).await.unwrap();
        assert_eq!(context.project_id, project);
        assert_eq!(context.user_id, alice);

        // the touch task is detached; give it a beat to land
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let record = store
            .find_access_token(&issued.token)
            .await
            .unwrap()
            .unwrap();
        assert!(record.last_used_at.is_some());
    }

    #[tokio::test]
    async fn test_validate_rejects_unknown_token() {
        let (store, _, _) = setup().await;
        let service = TokenService::new(store);

        let result = service.validate(&generate_token()).await;
        assert!(matches!(result, Err(TokenError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_validate_rejects_expired_token() {
        let (store, alice, project) = setup().await;
        let service = TokenService::new(store.clone());

        // inserted directly so the expiry can already be in the past
        let expired = (Utc::now() - chrono::Duration::seconds(1)).to_rfc3339();
        let token = generate_token();
        store
            .create_access_token(&token, alice, project, "old", Some(expired))
            .await
            .unwrap();
        let result = service.validate(&token).await;
        assert!(matches!(result, Err(TokenError::Unauthorized)));

        // boundary: an expiry equal to "now" is already expired
        let token = generate_token();
        store
            .create_access_token(&token, alice, project, "edge", Some(Utc::now().to_rfc3339()))
            .await
            .unwrap();
        let result = service.validate(&token).await;
        assert!(matches!(result, Err(TokenError::Unauthorized)));
    }
}
