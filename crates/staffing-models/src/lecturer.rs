//! Lecturer as seen from a contract
//!
//! Table: users (owned by the identity subsystem)

use serde::{Deserialize, Serialize};
use staffing_core::traits::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LecturerSummary {
    pub id: Id,
    pub display_name: String,
    pub email: String,
    pub department_id: Option<Id>,
}

impl LecturerSummary {
    /// Case-insensitive substring match used by the listing search box
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.display_name.to_lowercase().contains(&needle)
            || self.email.to_lowercase().contains(&needle)
    }
}
