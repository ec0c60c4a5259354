//! Hiring candidate record
//!
//! Table: candidates (owned by the recruitment subsystem). The hourly rate is
//! stored as free text there, so parsing happens at lookup time.

use serde::{Deserialize, Serialize};
use staffing_core::traits::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub id: Id,
    pub full_name: String,
    pub email: Option<String>,
    pub hourly_rate: Option<String>,
}
