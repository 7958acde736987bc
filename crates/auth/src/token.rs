//! Signed token codec (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{IdentityContext, IdentityId, PermissionSet, RoleValue};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("secret is required")]
    MissingSecret,

    #[error("failed to sign token: {0}")]
    Sign(String),

    /// Bad signature, expired, malformed or undecodable payload.
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Sign/verify capability the rest of the crate relies on.
///
/// `verify(sign(ctx))` returns `ctx` unchanged while the token is unexpired.
/// A verification failure is an ordinary `Err`, never a panic.
pub trait TokenCodec: Send + Sync {
    fn sign(&self, identity: &IdentityContext) -> Result<String, TokenError>;

    fn verify(&self, token: &str) -> Result<IdentityContext, TokenError>;
}

/// Wire claims: the identity payload plus the registered time claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenClaims {
    id: IdentityId,
    email: String,
    #[serde(default, skip_serializing_if = "RoleValue::is_absent")]
    role: RoleValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    permissions: Option<PermissionSet>,
    iat: i64,
    exp: i64,
}

impl TokenClaims {
    fn new(identity: &IdentityContext, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            role: identity.role.clone(),
            permissions: identity.permissions.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }
}

impl From<TokenClaims> for IdentityContext {
    fn from(claims: TokenClaims) -> Self {
        Self {
            id: claims.id,
            email: claims.email,
            role: claims.role,
            permissions: claims.permissions,
        }
    }
}

/// HS256 codec over a shared secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl Hs256TokenCodec {
    /// `ttl` is the lifetime stamped into every token this codec signs.
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign with an explicit issue time.
    pub fn sign_at(
        &self,
        identity: &IdentityContext,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims::new(identity, issued_at, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Sign(e.to_string()))
    }
}

impl core::fmt::Debug for Hs256TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn sign(&self, identity: &IdentityContext) -> Result<String, TokenError> {
        self.sign_at(identity, Utc::now())
    }

    fn verify(&self, token: &str) -> Result<IdentityContext, TokenError> {
        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        Ok(data.claims.into())
    }
}
