//! services/api/src/auth/token.rs
//!
//! Stateless bearer credentials: a signed, time-limited assertion of a user
//! id. Tokens are verified per request by checking the signature and expiry;
//! nothing is persisted. Known limitation carried over from the original
//! behavior: there is no revocation or rotation, a token stays valid until
//! it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// The user id this token asserts.
    sub: Uuid,
    /// Expiry, seconds since the epoch.
    exp: i64,
    /// Issued-at, seconds since the epoch.
    iat: i64,
}

/// Issues and verifies HS256-signed user tokens with a fixed time-to-live.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    /// Signs a token asserting `user_id` for the configured window.
    pub fn issue(&self, user_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Resolves a token back to a user id.
    ///
    /// Any failure (bad signature, malformed payload, expired) is an absence
    /// of identity, never an error the caller has to branch on.
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .ok()
            .map(|data| data.claims.sub)
    }
}
