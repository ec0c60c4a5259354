//! # staffing-core
//!
//! Core types, traits, and utilities shared by the teaching-contract crates:
//! - Common error types
//! - Result type aliases
//! - The entity trait
//! - Pagination types
//! - Clock abstraction
//! - Configuration types

pub mod clock;
pub mod config;
pub mod error;
pub mod pagination;
pub mod result;
pub mod traits;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::*;
pub use pagination::*;
pub use result::*;
pub use traits::*;
