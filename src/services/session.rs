//! Stateless session credentials for interactive callers.
//!
//! A successful login yields a signed, time-bound assertion (JWT, HS256)
//! carrying the user id. Nothing is stored server-side; the assertion is
//! self-verifying and cannot be revoked before it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id
    sub: i32,
    /// Expiry as a unix timestamp
    exp: i64,
}

pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl SessionKeys {
    #[must_use]
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_hours,
        }
    }

    /// Builds the keys from the configured secret. An empty secret yields an
    /// ephemeral one: sessions then die with the process.
    #[must_use]
    pub fn from_config(session_secret: &str, ttl_hours: i64) -> Self {
        if session_secret.is_empty() {
            tracing::warn!(
                "no session secret configured; using an ephemeral secret; \
                 sessions will not survive a restart"
            );
            return Self::new(&crate::crypto::generate_key(), ttl_hours);
        }
        Self::new(session_secret.as_bytes(), ttl_hours)
    }

    pub fn issue(&self, user_id: i32) -> Result<String, jsonwebtoken::errors::Error> {
        let exp = Utc::now() + Duration::hours(self.ttl_hours);
        let claims = Claims {
            sub: user_id,
            exp: exp.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Returns the user id for a valid, unexpired credential.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<i32> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .ok()
            .map(|data| data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_verify_round_trip() {
        let keys = SessionKeys::new(b"test-secret", 24);
        let token = keys.issue(42).unwrap();
        assert_eq!(keys.verify(&token), Some(42));
    }

    #[test]
    fn test_rejects_garbage() {
        let keys = SessionKeys::new(b"test-secret", 24);
        assert_eq!(keys.verify("not-a-token"), None);
        assert_eq!(keys.verify(""), None);
    }

    #[test]
    fn test_rejects_foreign_secret() {
        let keys = SessionKeys::new(b"test-secret", 24);
        let other = SessionKeys::new(b"other-secret", 24);
        let token = keys.issue(7).unwrap();
        assert_eq!(other.verify(&token), None);
    }

    #[test]
    fn test_rejects_expired() {
        let keys = SessionKeys::new(b"test-secret", -2);
        let token = keys.issue(7).unwrap();
        assert_eq!(keys.verify(&token), None);
    }
}
