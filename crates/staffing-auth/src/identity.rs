//! Authenticated user

use staffing_core::traits::Id;
use staffing_models::{Caller, CallerRole};

use crate::jwt::Claims;

/// The user behind a request, as established by the authenticator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    caller: Caller,
    /// Token id, for audit logging
    pub token_id: Option<String>,
}

impl CurrentUser {
    pub fn new(caller: Caller) -> Self {
        Self {
            caller,
            token_id: None,
        }
    }

    pub fn from_claims(caller: Caller, claims: &Claims) -> Self {
        Self {
            caller,
            token_id: claims.jti.clone(),
        }
    }

    pub fn id(&self) -> Id {
        self.caller.id
    }

    pub fn role(&self) -> CallerRole {
        self.caller.role
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }
}
