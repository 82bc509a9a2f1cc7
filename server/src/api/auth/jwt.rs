//! JWT session token handling

use std::fmt;

use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT validation error
#[derive(Debug)]
pub enum JwtError {
    /// Token has expired
    Expired,
    /// Token signature is invalid
    InvalidSignature,
    /// Other validation error
    Invalid(String),
}

impl fmt::Display for JwtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expired => write!(f, "Session token has expired"),
            Self::InvalidSignature => write!(f, "Invalid session token signature"),
            Self::Invalid(msg) => write!(f, "Invalid session token: {}", msg),
        }
    }
}

impl std::error::Error for JwtError {}

/// JWT claims for session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Team member ID
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub auth_method: String,
}

impl SessionClaims {
    pub fn new(member_id: &str, auth_method: &str, ttl_days: u32) -> Self {
        let now = Utc::now();
        let exp = now + Duration::days(ttl_days as i64);

        Self {
            sub: member_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: cuid2::create_id(),
            auth_method: auth_method.to_string(),
        }
    }

    pub fn member_id(&self) -> &str {
        &self.sub
    }
}

/// Create a signed JWT session token
pub fn create_session_token(
    signing_key: &[u8],
    member_id: &str,
    auth_method: &str,
    ttl_days: u32,
) -> Result<String> {
    let claims = SessionClaims::new(member_id, auth_method, ttl_days);
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .map_err(|e| anyhow!("Failed to create JWT: {}", e))
}

/// Validate and decode a JWT session token
pub fn validate_session_token(token: &str, signing_key: &[u8]) -> Result<SessionClaims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data =
        decode::<SessionClaims>(token, &DecodingKey::from_secret(signing_key), &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::Invalid(e.to_string()),
            })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> Vec<u8> {
        vec![7u8; 32]
    }

    #[test]
    fn test_create_and_validate() {
        let key = test_key();
        let token = create_session_token(&key, "member1", "otp", 30).unwrap();
        let claims = validate_session_token(&token, &key).unwrap();
        assert_eq!(claims.member_id(), "member1");
        assert_eq!(claims.auth_method, "otp");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_signature() {
        let token = create_session_token(&test_key(), "member1", "password", 30).unwrap();
        let other_key = vec![8u8; 32];
        assert!(matches!(
            validate_session_token(&token, &other_key),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(validate_session_token("not.a.token", &test_key()).is_err());
    }

    #[test]
    fn test_unique_jti() {
        let c1 = SessionClaims::new("m", "otp", 30);
        let c2 = SessionClaims::new("m", "otp", 30);
        assert_ne!(c1.jti, c2.jti);
    }
}
