//! Result type aliases

use crate::error::StaffingError;

/// Standard Result type for staffing operations
pub type StaffingResult<T> = Result<T, StaffingError>;
