//! Request authentication
//!
//! Turns the `Authorization` header into a [`CurrentUser`]. Only bearer
//! tokens are accepted.

use std::sync::Arc;

use staffing_core::error::StaffingError;
use thiserror::Error;
use tracing::debug;

use crate::identity::CurrentUser;
use crate::jwt::{extract_bearer_token, JwtError, JwtService};

/// Authentication errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Authentication required")]
    Required,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token expired")]
    TokenExpired,
}

impl From<AuthError> for StaffingError {
    fn from(err: AuthError) -> Self {
        StaffingError::Unauthorized {
            message: err.to_string(),
        }
    }
}

/// Validates bearer tokens against the shared secret
#[derive(Clone)]
pub struct Authenticator {
    jwt: Arc<JwtService>,
}

impl Authenticator {
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }

    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Authenticate from the raw `Authorization` header value
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<CurrentUser, AuthError> {
        let token = authorization
            .and_then(extract_bearer_token)
            .ok_or(AuthError::Required)?;

        let claims = self.jwt.validate_token(token).map_err(|e| match e {
            JwtError::Expired => AuthError::TokenExpired,
            other => {
                debug!(error = %other, "Rejected bearer token");
                AuthError::InvalidCredentials
            }
        })?;
        let caller = claims.caller().map_err(|e| {
            debug!(error = %e, "Token claims do not describe a caller");
            AuthError::InvalidCredentials
        })?;

        Ok(CurrentUser::from_claims(caller, &claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staffing_models::{Caller, CallerRole};

    fn authenticator() -> Authenticator {
        Authenticator::new(Arc::new(JwtService::new(b"test-secret-key-at-least-32-bytes")))
    }

    #[test]
    fn test_valid_bearer_token() {
        let auth = authenticator();
        let caller = Caller::new(5, CallerRole::Lecturer, Some(2));
        let token = auth.jwt().create_token(&caller, 600).unwrap();

        let user = auth.authenticate(Some(format!("Bearer {}", token).as_str())).unwrap();
        assert_eq!(user.caller(), &caller);
        assert!(user.token_id.is_some());
    }

    #[test]
    fn test_missing_and_malformed_headers() {
        let auth = authenticator();
        assert_eq!(auth.authenticate(None).unwrap_err(), AuthError::Required);
        assert_eq!(auth.authenticate(Some("Basic Zm9v")).unwrap_err(), AuthError::Required);
        assert_eq!(
            auth.authenticate(Some("Bearer not-a-jwt")).unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn test_expired_token() {
        let auth = authenticator();
        let token = auth
            .jwt()
            .create_token(&Caller::new(5, CallerRole::Admin, Some(2)), -3600)
            .unwrap();
        assert_eq!(
            auth.authenticate(Some(format!("Bearer {}", token).as_str())).unwrap_err(),
            AuthError::TokenExpired
        );

        let err: StaffingError = AuthError::TokenExpired.into();
        assert_eq!(err.status_code(), 401);
    }
}
