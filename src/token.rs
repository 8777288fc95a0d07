//! Signed bearer tokens binding a request to a customer identity.
//!
//! Tokens are HS256 JWTs carrying the username and a 1-hour absolute expiry.
//! Verification is a pure function of the token and the signing secret; the
//! database stays the source of truth for authorization flags.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Claim set embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the authenticated customer.
    pub sub: String,
    /// Absolute expiry as a Unix timestamp.
    pub exp: i64,
}

/// Issues and verifies bearer tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    /// Create a signer from the shared secret and a token lifetime in seconds.
    #[must_use]
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Issue a signed token for `username`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Database` if JWT encoding fails, which only
    /// happens on key misconfiguration.
    pub fn issue(&self, username: &str) -> Result<String> {
        let claims = Claims {
            sub: username.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| StoreError::Database(format!("failed to sign token: {e}")))
    }

    /// Verify a token's signature and expiry, returning the embedded claims.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` for a bad signature, malformed
    /// token, or expired claim set.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    StoreError::Unauthenticated("Token has expired.".to_string())
                }
                _ => StoreError::Unauthenticated("Invalid token.".to_string()),
            })
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").field("ttl", &self.ttl).finish()
    }
}
