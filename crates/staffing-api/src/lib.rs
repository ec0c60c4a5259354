//! # staffing-api
//!
//! JSON-over-HTTP surface of the teaching-contract engine.
//!
//! Every route authenticates the caller from a bearer token and hands the
//! resulting caller to the contract services, which
//! apply the visibility rules.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod routes;

pub use error::{ApiError, ApiResult};
pub use extractors::AppState;
pub use routes::{app, router};
