//! Secret custody: encrypt-on-write, decrypt-on-read, authorization first.
//!
//! Every operation takes a resolved [`Credential`] and checks it against the
//! policy table before touching storage. Plaintext exists only between the
//! transport and the cipher; the write path returns metadata, never values,
//! and the bulk plaintext path is reachable through a project token alone.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::crypto::SecretCipher;
use crate::db::Store;
use crate::domain::{Action, Credential};
use crate::entities::secrets;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for SecretError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// What the browse and write paths see: everything about a secret except
/// its value.
#[derive(Debug, Clone, Serialize)]
pub struct SecretMetadata {
    pub id: i32,
    pub key: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<secrets::Model> for SecretMetadata {
    fn from(model: secrets::Model) -> Self {
        Self {
            id: model.id,
            key: model.key,
            description: model.description,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct SecretService {
    store: Store,
    cipher: Arc<SecretCipher>,
}

impl SecretService {
    #[must_use]
    pub const fn new(store: Store, cipher: Arc<SecretCipher>) -> Self {
        Self { store, cipher }
    }

    /// Checks the credential against the policy table for one project.
    /// Sessions resolve to a stored role; a project token is a fixed
    /// read-only capability on exactly its own project.
    async fn authorize(
        &self,
        credential: Credential,
        project_id: i32,
        action: Action,
    ) -> Result<(), SecretError> {
        let allowed = match credential {
            Credential::Session { user_id } => self
                .store
                .role_of(user_id, project_id)
                .await?
                .is_some_and(|role| role.allows(action)),
            Credential::ProjectToken { project_id: scope } => {
                scope == project_id && action == Action::ReadSecret
            }
        };

        if allowed {
            Ok(())
        } else {
            Err(SecretError::Forbidden)
        }
    }

    /// Encrypts and stores a value under `(project_id, key)`, inserting or
    /// replacing atomically. Returns metadata only.
    pub async fn upsert(
        &self,
        credential: Credential,
        project_id: i32,
        key: &str,
        value: &str,
        description: Option<&str>,
    ) -> Result<SecretMetadata, SecretError> {
        let Credential::Session { user_id } = credential else {
            return Err(SecretError::Forbidden);
        };
        self.authorize(credential, project_id, Action::WriteSecret)
            .await?;

        let encrypted = self
            .cipher
            .encrypt(value)
            .map_err(|e| SecretError::Internal(format!("Encryption failed: {e}")))?;

        let row = self
            .store
            .upsert_secret(project_id, key, &encrypted, description, user_id)
            .await?;

        Ok(row.into())
    }

    /// Keys, descriptions and timestamps for a project. The browsing view.
    pub async fn list_metadata(
        &self,
        credential: Credential,
        project_id: i32,
    ) -> Result<Vec<SecretMetadata>, SecretError> {
        self.authorize(credential, project_id, Action::ReadSecret)
            .await?;

        let rows = self.store.list_secrets(project_id).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Decrypts every secret of the project. Only a project token may reach
    /// this; the interactive session path is rejected outright so a leaked
    /// session credential never exposes plaintext in bulk.
    pub async fn resolve_all(
        &self,
        credential: Credential,
        project_id: i32,
    ) -> Result<BTreeMap<String, String>, SecretError> {
        let Credential::ProjectToken { project_id: scope } = credential else {
            return Err(SecretError::Forbidden);
        };
        if scope != project_id {
            return Err(SecretError::Forbidden);
        }

        let rows = self.store.list_secrets(project_id).await?;

        let mut resolved = BTreeMap::new();
        for row in rows {
            let plaintext = self.cipher.decrypt(&row.value).map_err(|e| {
                SecretError::Internal(format!("Failed to decrypt secret '{}': {e}", row.key))
            })?;
            resolved.insert(row.key, plaintext);
        }

        Ok(resolved)
    }
}
