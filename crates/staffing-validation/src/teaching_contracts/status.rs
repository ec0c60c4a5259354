//! Manual status override validation

use serde::Deserialize;
use staffing_core::error::ValidationErrors;
use staffing_models::ContractStatus;

use crate::base::present;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusOverrideDraft {
    #[serde(default)]
    pub status: Option<String>,
}

pub struct StatusOverrideValidation;

impl StatusOverrideValidation {
    /// Only persisted statuses may be written; display statuses are rejected
    pub fn validate(draft: &StatusOverrideDraft) -> Result<ContractStatus, ValidationErrors> {
        let raw = present(draft.status.as_deref())
            .ok_or_else(|| ValidationErrors::single("status", "can't be blank"))?;

        raw.parse::<ContractStatus>().map_err(|_| {
            ValidationErrors::single(
                "status",
                "must be one of: DRAFT, LECTURER_SIGNED, MANAGEMENT_SIGNED, COMPLETED",
            )
        })
    }
}
