use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::TokenConfig;

/// User role carried inside a token.
///
/// Roles other than `admin` and `user` are kept verbatim so a token issued
/// by a newer identity service still verifies on an older resource service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    User,
    Other(String),
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "admin" => Role::Admin,
            "user" => Role::User,
            _ => Role::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => "admin".to_string(),
            Role::User => "user".to_string(),
            Role::Other(other) => other,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::User => f.write_str("user"),
            Role::Other(other) => f.write_str(other),
        }
    }
}

/// Public identity of an authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub iat: i64, // Issued at
    pub exp: i64, // Expiration time
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity {
            id: claims.id,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
}

impl From<&jsonwebtoken::errors::Error> for TokenError {
    fn from(err: &jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        }
    }
}

/// Token verification capability shared by every protected service.
///
/// Resource services depend on this trait only; they never see the signing
/// side of [`TokenService`].
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, raw_token: &str) -> Result<Identity, TokenError>;
}

/// Issues and verifies HS256 session tokens with a process-wide secret
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &TokenConfig) -> Result<Self> {
        if config.secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must be set to a non-empty value");
        }
        if config.ttl_secs <= 0 {
            anyhow::bail!("TOKEN_TTL_SECS must be positive, got {}", config.ttl_secs);
        }

        tracing::info!(ttl_secs = config.ttl_secs, "Initializing token service (HS256)");
        Ok(Self::from_secret(
            config.secret.as_bytes(),
            Duration::seconds(config.ttl_secs),
        ))
    }

    pub fn from_secret(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is dead at its `exp` second, not a minute later
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a session token for a verified identity
    pub fn issue(&self, identity: &Identity) -> Result<String> {
        self.issue_at(identity, Utc::now())
    }

    /// Create a session token as if issued at `issued_at`
    pub fn issue_at(&self, identity: &Identity, issued_at: DateTime<Utc>) -> Result<String> {
        let exp = issued_at + self.ttl;
        let claims = Claims {
            id: identity.id,
            email: identity.email.clone(),
            role: identity.role.clone(),
            iat: issued_at.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to encode JWT token")
    }

    /// Verify a raw bearer token and return the identity it carries.
    ///
    /// HMAC comparison is constant-time (jsonwebtoken delegates it to ring).
    pub fn verify(&self, raw_token: &str) -> Result<Identity, TokenError> {
        if raw_token.split('.').count() != 3 {
            return Err(TokenError::Malformed);
        }

        let token_data = decode::<Claims>(raw_token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::from(&e))?;

        // jsonwebtoken accepts exp == now; a token is expired at its exp second
        if token_data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims.into())
    }
}

impl TokenVerifier for TokenService {
    fn verify(&self, raw_token: &str) -> Result<Identity, TokenError> {
        TokenService::verify(self, raw_token)
    }
}
