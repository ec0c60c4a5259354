//! # staffing-auth
//!
//! Caller identity for the teaching-contract engine.
//!
//! ## Features
//!
//! - JWT bearer tokens carrying user id, role and department
//! - [`Authenticator`] turning an `Authorization` header into a [`CurrentUser`]

pub mod identity;
pub mod jwt;
pub mod middleware;

pub use identity::CurrentUser;
pub use jwt::{extract_bearer_token, Claims, JwtError, JwtService};
pub use middleware::{AuthError, Authenticator};
