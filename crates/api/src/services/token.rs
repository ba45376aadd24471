//! Signed bearer-token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a symmetric secret shared by issuance
//! and verification. Verification is stateless: signature, issuer, audience,
//! and expiry are checked against the token alone, with no store round-trip.
//!
//! Role claims are baked in at issuance time. A role change takes effect
//! only when the user re-authenticates and receives a fresh token; the
//! reissue-on-login boundary is the only invalidation point.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use clementine_core::{Role, UserId};

use crate::config::JwtConfig;
use crate::models::user::User;

/// Errors that can occur during token operations.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing the token failed.
    #[error("failed to sign token: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    /// The token is malformed, has a bad signature, wrong issuer or
    /// audience, or has expired.
    #[error("invalid token: {0}")]
    Verify(#[source] jsonwebtoken::errors::Error),
}

/// Claims carried by an issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's stable ID, as a string per JWT convention.
    pub sub: String,
    /// The user's email address.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// One entry per role held at issuance time.
    pub roles: Vec<String>,
    /// Issuer.
    pub iss: String,
    /// Audience.
    pub aud: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Absolute expiry, seconds since the epoch.
    pub exp: i64,
}

impl Claims {
    /// The user ID carried in the subject claim.
    ///
    /// Returns `None` if the subject is not a well-formed ID; verification
    /// treats that as an invalid token.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse::<i32>().ok().map(UserId::new)
    }

    /// Whether the token carries the given role claim.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.iter().any(|r| r == role.as_str())
    }

    /// Whether the token carries the Admin role claim.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role(Role::Admin)
    }
}

/// Issues and verifies signed bearer tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    lifetime_hours: i64,
}

impl TokenIssuer {
    /// Create a token issuer from the JWT configuration.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            lifetime_hours: config.lifetime_hours,
        }
    }

    /// Issue a signed token for a user with their currently assigned roles.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Sign` if encoding fails.
    pub fn issue(&self, user: &User, roles: &[Role]) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.as_str().to_owned(),
            name: user.display_name(),
            roles: roles.iter().map(|r| r.as_str().to_owned()).collect(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.lifetime_hours)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Sign)
    }

    /// Verify a token's signature, issuer, audience, and expiry, returning
    /// its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Verify` if any check fails.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Verify)
    }
}
