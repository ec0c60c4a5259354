//! Manual status correction

use staffing_core::result::StaffingResult;
use staffing_core::traits::Id;
use staffing_models::{Caller, TeachingContract};
use staffing_validation::{StatusOverrideDraft, StatusOverrideValidation};
use tracing::warn;

use super::ContractService;

impl ContractService {
    /// Overwrite the persisted status. Signature images stay as they are.
    pub async fn override_status(
        &self,
        caller: &Caller,
        id: Id,
        draft: &StatusOverrideDraft,
    ) -> StaffingResult<TeachingContract> {
        Self::require_admin(caller, "override contract status")?;
        let status = StatusOverrideValidation::validate(draft)?;
        let before = self.load_visible(caller, id).await?;

        let contract = self.store.set_status(id, status, self.clock.now()).await?;
        warn!(
            contract_id = id,
            caller_id = caller.id,
            from = %before.status,
            to = %contract.status,
            "Contract status overridden"
        );
        Ok(contract)
    }
}
