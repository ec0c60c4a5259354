//! Delete validation
//!
//! Signed contracts are kept as history; only drafts may be removed. The store
//! repeats this check under a row lock, so this is the early exit only.

use staffing_core::error::StateError;
use staffing_models::TeachingContract;

pub struct DeleteContractValidation;

impl DeleteContractValidation {
    pub fn validate(contract: &TeachingContract) -> Result<(), StateError> {
        if contract.status.is_draft() {
            Ok(())
        } else {
            Err(StateError::NotDraft {
                contract_id: contract.id,
                status: contract.status.to_string(),
            })
        }
    }
}
