//! Authentication
//!
//! Callers present an HS256 bearer token whose `sub` is their principal
//! UUID. The principal extracted here is the only caller identity the
//! registries ever see; request bodies never carry one.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use core_kernel::Principal;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (principal UUID)
    pub sub: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl TokenClaims {
    /// Principal named by `sub`
    ///
    /// # Errors
    ///
    /// `InvalidSubject` if `sub` is not a UUID or is the null principal
    pub fn principal(&self) -> Result<Principal, AuthError> {
        let uuid = Uuid::parse_str(&self.sub)
            .map_err(|_| AuthError::InvalidSubject(self.sub.clone()))?;
        let principal = Principal::from_uuid(uuid);
        if principal.is_null() {
            return Err(AuthError::InvalidSubject(self.sub.clone()));
        }
        Ok(principal)
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token subject is not a principal: {0}")]
    InvalidSubject(String),
}

/// Authenticated caller, placed in request extensions by the auth middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Principal);

/// Creates a new JWT token
///
/// # Arguments
///
/// * `principal` - Caller the token speaks for
/// * `secret` - JWT secret key
/// * `expiration_secs` - Token validity in seconds
pub fn create_token(
    principal: Principal,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs.min(u64::from(u32::MAX)) as i64);

    let claims = TokenClaims {
        sub: principal.as_uuid().to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a JWT token
///
/// # Arguments
///
/// * `token` - The JWT token to validate
/// * `secret` - JWT secret key
pub fn validate_token(token: &str, secret: &str) -> Result<TokenClaims, AuthError> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
