//! Symmetric encryption boundary for secret values.
//!
//! AES-256-GCM with a random 96-bit nonce per call; the stored form is
//! `base64(nonce || ciphertext)`. Repeated encryption of the same plaintext
//! therefore produces different ciphertexts. GCM authenticates the
//! ciphertext, so decryption of anything this process did not produce with
//! the same key fails loudly instead of returning garbled bytes.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use anyhow::{Context, Result, anyhow, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

/// Key size in bytes (256 bits for AES-256).
pub const KEY_SIZE: usize = 32;

/// AES-GCM nonce size in bytes.
pub const NONCE_SIZE: usize = 12;

/// Process-wide cipher over the fixed encryption key. Constructed once at
/// startup and passed into the services that need it.
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    pub fn new(key_bytes: &[u8]) -> Result<Self> {
        if key_bytes.len() != KEY_SIZE {
            bail!(
                "encryption key must be {KEY_SIZE} bytes, got {}",
                key_bytes.len()
            );
        }
        let key = Key::<Aes256Gcm>::from_slice(key_bytes);
        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Builds the cipher from the configured base64 key. An empty config
    /// value yields an ephemeral random key: fine for tests and first runs,
    /// useless after a restart, hence the warning.
    pub fn from_config(encryption_key: &str) -> Result<Self> {
        if encryption_key.is_empty() {
            tracing::warn!(
                "no encryption key configured; using an ephemeral key; \
                 stored secrets will be unreadable after restart"
            );
            return Self::new(&generate_key());
        }

        let key_bytes = BASE64
            .decode(encryption_key)
            .context("encryption key is not valid base64")?;
        Self::new(&key_bytes)
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|e| anyhow!("encryption failed: {e}"))?;

        let mut raw = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&ciphertext);
        Ok(BASE64.encode(raw))
    }

    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let raw = BASE64
            .decode(encoded)
            .context("stored ciphertext is not valid base64")?;
        if raw.len() < NONCE_SIZE {
            bail!("stored ciphertext is shorter than the nonce");
        }

        let (nonce, ciphertext) = raw.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|e| anyhow!("decryption failed: {e}"))?;

        String::from_utf8(plaintext).context("decrypted value is not valid UTF-8")
    }
}

/// Generates a random 256-bit key.
#[must_use]
pub fn generate_key() -> [u8; KEY_SIZE] {
    Aes256Gcm::generate_key(&mut OsRng).into()
}
