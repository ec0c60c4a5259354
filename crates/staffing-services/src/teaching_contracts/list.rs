//! Listing behind the access gate

use std::collections::HashMap;

use rust_decimal::Decimal;
use staffing_core::pagination::{Page, PageRequest};
use staffing_core::result::StaffingResult;
use staffing_core::traits::Id;
use staffing_models::Caller;
use staffing_validation::{ListFilterDraft, ListFilterValidation};
use tracing::debug;

use super::{ContractService, ContractView};

impl ContractService {
    /// Contracts visible to `caller`, newest first.
    ///
    /// Visibility comes from the caller's scope alone; lecturer and
    /// department filters sent by the client are ignored.
    pub async fn list(
        &self,
        caller: &Caller,
        draft: &ListFilterDraft,
        page: PageRequest,
    ) -> StaffingResult<Page<ContractView>> {
        let filters = ListFilterValidation::validate(draft)?;
        let page = page.normalized(self.config.max_page_size);
        let today = self.clock.today();

        let contracts = self.store.list(caller.scope(), &filters, today, page).await?;

        let mut lecturer_ids: Vec<Id> = contracts.items.iter().map(|c| c.lecturer_id).collect();
        lecturer_ids.sort_unstable();
        lecturer_ids.dedup();
        let lecturers = self.lecturers.find_lecturers(&lecturer_ids).await?;

        let mut rates: HashMap<Id, Option<Decimal>> = HashMap::with_capacity(lecturers.len());
        for lecturer in &lecturers {
            let rate = self.rates.resolve(&lecturer.display_name, &lecturer.email).await;
            rates.insert(lecturer.id, rate);
        }
        let by_id: HashMap<Id, _> = lecturers.into_iter().map(|l| (l.id, l)).collect();

        debug!(
            caller_id = caller.id,
            scope = ?caller.scope(),
            total = contracts.total,
            page = page.page,
            "Contracts listed"
        );

        let exchange_rate = self.config.exchange_rate_khr;
        Ok(contracts.map(|contract| {
            let lecturer = by_id.get(&contract.lecturer_id).cloned();
            let rate = rates.get(&contract.lecturer_id).copied().flatten();
            ContractView::new(contract, lecturer, rate, exchange_rate, today)
        }))
    }
}
