//! Access token minting and verification.
//!
//! Tokens are HS256 JWTs embedding the user id and role. They are delivered
//! as an `HttpOnly` cookie after a completed OAuth2 login and decoded by the
//! API middleware on every request.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User id (subject).
    pub sub: String,
    /// User role.
    pub role: String,
    /// Expiry as a UNIX timestamp.
    pub exp: i64,
    /// Issued-at as a UNIX timestamp.
    pub iat: i64,
}

/// Mints and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec from the configured secret.
    #[must_use]
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Token lifetime in seconds.
    #[must_use]
    pub const fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Mint a signed access token for a user.
    pub fn mint(&self, user_id: &str, role: &str) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: now + self.ttl_secs,
            iat: now,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign access token: {e}")))
    }

    /// Verify a token and return its claims.
    ///
    /// Expired or tampered tokens yield [`AppError::Unauthorized`].
    pub fn verify(&self, token: &str) -> AppResult<AccessTokenClaims> {
        decode::<AccessTokenClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }
}
