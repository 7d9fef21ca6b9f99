//! Stateless session tokens.
//!
//! The admin session is a signed, time-limited token carried in an
//! HTTP-only cookie. Nothing is persisted server-side: logout only clears
//! the cookie, so a captured token stays valid until its one-hour expiry.
//! That is a known limitation of the stateless design; revoking early
//! would require a denylist or a per-admin token version checked here.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Session lifetime, also used for the cookie Max-Age.
pub const TOKEN_TTL_SECS: i64 = 3600;

/// The authenticated admin carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    email: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies signed session tokens (HS256).
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Produce a signed token expiring [`TOKEN_TTL_SECS`] from now.
    pub fn issue(&self, id: i64, email: &str) -> Result<String> {
        self.issue_at(id, email, Utc::now())
    }

    fn issue_at(&self, id: i64, email: &str, now: DateTime<Utc>) -> Result<String> {
        let claims = Claims {
            sub: id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(TOKEN_TTL_SECS)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .context("Failed to sign session token")
    }

    /// Check signature and expiry. Every failure collapses to `None` so
    /// callers cannot tell a forged token from an expired one.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .ok()
            .map(|data| Identity {
                id: data.claims.sub,
                email: data.claims.email,
            })
    }
}
