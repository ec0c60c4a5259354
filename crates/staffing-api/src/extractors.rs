//! Axum extractors for API handlers

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Query},
    http::{header, request::Parts},
};
use staffing_auth::{Authenticator, CurrentUser};
use staffing_core::error::StaffingError;
use staffing_core::pagination::PageRequest;
use staffing_services::ContractService;

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub contracts: Arc<ContractService>,
    pub auth: Authenticator,
}

impl AppState {
    pub fn new(contracts: ContractService, auth: Authenticator) -> Self {
        Self {
            contracts: Arc::new(contracts),
            auth,
        }
    }
}

/// Caller resolved from the `Authorization: Bearer` header
pub struct AuthenticatedUser(pub CurrentUser);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        app_state
            .auth
            .authenticate(header)
            .map(AuthenticatedUser)
            .map_err(|e| ApiError::from(StaffingError::from(e)))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// `page` and `limit` from the query string; unparseable values fall back to defaults
pub struct Pagination(pub PageRequest);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<PageRequest>::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|_| Query(PageRequest::default()));
        Ok(Pagination(params))
    }
}
