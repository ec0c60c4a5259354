//! JWT bearer tokens
//!
//! Tokens are issued by the identity subsystem; they carry the caller's id,
//! role and department, which is all the contract engine needs.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use staffing_core::traits::Id;
use staffing_models::{Caller, CallerRole};
use thiserror::Error;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<Id>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    /// Caller identity carried by these claims
    pub fn caller(&self) -> Result<Caller, JwtError> {
        let id: Id = self
            .sub
            .parse()
            .map_err(|_| JwtError::Invalid("Invalid user ID in token".to_string()))?;
        let role: CallerRole = self
            .role
            .parse()
            .map_err(|e: staffing_models::ParseStatusError| JwtError::Invalid(e.to_string()))?;
        Ok(Caller::new(id, role, self.department_id))
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token is expired")]
    Expired,
    #[error("Invalid token: {0}")]
    Invalid(String),
    #[error("Missing token")]
    Missing,
    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

/// JWT service for creating and validating tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// HMAC-SHA256 with the given secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a token for `caller`
    pub fn create_token(&self, caller: &Caller, expires_in_seconds: i64) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: caller.id.to_string(),
            role: caller.role.as_str().to_string(),
            department_id: caller.department_id,
            exp: now + expires_in_seconds,
            iat: now,
            jti: Some(uuid::Uuid::new_v4().to_string()),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })?;

        Ok(token_data.claims)
    }

    /// Validate a token and return the caller it identifies
    pub fn caller(&self, token: &str) -> Result<Caller, JwtError> {
        self.validate_token(token)?.caller()
    }
}

/// Extract bearer token from Authorization header
pub fn extract_bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret-key-at-least-32-bytes";

    #[test]
    fn test_create_and_validate_token() {
        let service = JwtService::new(SECRET);
        let caller = Caller::new(7, CallerRole::Management, Some(3));

        let token = service.create_token(&caller, 3600).unwrap();
        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, "management");
        assert_eq!(claims.department_id, Some(3));
        assert_eq!(service.caller(&token).unwrap(), caller);
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(SECRET);
        let caller = Caller::new(7, CallerRole::Lecturer, None);
        let token = service.create_token(&caller, -3600).unwrap();
        assert!(matches!(service.validate_token(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = JwtService::new(SECRET)
            .create_token(&Caller::new(1, CallerRole::Admin, Some(1)), 3600)
            .unwrap();
        let other = JwtService::new(b"another-secret-key-of-32-bytes!!");
        assert!(matches!(other.validate_token(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_unknown_role_is_invalid() {
        let claims = Claims {
            sub: "1".to_string(),
            role: "dean".to_string(),
            department_id: None,
            exp: 0,
            iat: 0,
            jti: None,
        };
        assert!(matches!(claims.caller(), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer  abc123 "), Some("abc123"));
        assert_eq!(extract_bearer_token("Basic abc123"), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
    }
}
