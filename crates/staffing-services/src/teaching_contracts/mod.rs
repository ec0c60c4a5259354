//! Teaching contract services
//!
//! One [`ContractService`] carries every dependency; each operation lives in
//! its own module as an `impl` block on it. Every operation that takes a
//! contract id goes through [`ContractService::load_visible`] first.

mod create;
mod delete;
mod list;
mod render;
mod sign;
mod status;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use staffing_core::clock::Clock;
use staffing_core::config::ContractsConfig;
use staffing_core::error::StaffingError;
use staffing_core::pagination::MAX_PAGE_SIZE;
use staffing_core::result::StaffingResult;
use staffing_core::traits::Id;
use staffing_db::{LecturerDirectory, TeachingContractStore};
use staffing_documents::{ContractFigures, PdfEngine, Storage};
use staffing_models::{Caller, ContractScope, DisplayStatus, Entity, LecturerSummary, TeachingContract};

use crate::rates::RateResolver;

pub use render::RenderedPdf;
pub use sign::SignatureUpload;

/// Tunables of the contract services
#[derive(Debug, Clone)]
pub struct ContractServiceConfig {
    pub signature_max_bytes: usize,
    pub exchange_rate_khr: Decimal,
    pub render_timeout: Duration,
    pub template_dir: PathBuf,
    pub max_page_size: i64,
}

impl Default for ContractServiceConfig {
    fn default() -> Self {
        Self::from(&ContractsConfig::default())
    }
}

impl From<&ContractsConfig> for ContractServiceConfig {
    fn from(config: &ContractsConfig) -> Self {
        Self {
            signature_max_bytes: config.signature_max_bytes,
            exchange_rate_khr: config.exchange_rate_khr,
            render_timeout: Duration::from_secs(config.render_timeout_seconds),
            template_dir: PathBuf::from(&config.template_dir),
            max_page_size: if config.max_page_size > 0 {
                config.max_page_size
            } else {
                MAX_PAGE_SIZE
            },
        }
    }
}

/// A contract as returned by list and detail
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractView {
    #[serde(flatten)]
    pub contract: TeachingContract,
    pub lecturer: Option<LecturerSummary>,
    pub display_status: DisplayStatus,
    pub total_hours: i64,
    pub hourly_rate: Option<Decimal>,
    pub total_usd: Option<Decimal>,
}

impl ContractView {
    fn new(
        contract: TeachingContract,
        lecturer: Option<LecturerSummary>,
        hourly_rate: Option<Decimal>,
        exchange_rate: Decimal,
        today: NaiveDate,
    ) -> Self {
        let figures = ContractFigures::compute(contract.total_hours(), hourly_rate, exchange_rate);
        Self {
            display_status: contract.display_status(today),
            total_hours: figures.total_hours,
            hourly_rate: figures.hourly_rate,
            total_usd: figures.display_usd(),
            lecturer,
            contract,
        }
    }
}

/// Contract lifecycle operations
#[derive(Clone)]
pub struct ContractService {
    store: Arc<dyn TeachingContractStore>,
    lecturers: Arc<dyn LecturerDirectory>,
    rates: RateResolver,
    storage: Arc<dyn Storage>,
    engine: Arc<dyn PdfEngine>,
    clock: Arc<dyn Clock>,
    config: ContractServiceConfig,
}

impl ContractService {
    pub fn new(
        store: Arc<dyn TeachingContractStore>,
        lecturers: Arc<dyn LecturerDirectory>,
        rates: RateResolver,
        storage: Arc<dyn Storage>,
        engine: Arc<dyn PdfEngine>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            lecturers,
            rates,
            storage,
            engine,
            clock,
            config: ContractServiceConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ContractServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ContractServiceConfig {
        &self.config
    }

    /// Detail view of one contract
    pub async fn detail(&self, caller: &Caller, id: Id) -> StaffingResult<ContractView> {
        let contract = self.load_visible(caller, id).await?;
        let lecturer = self.lecturers.find_lecturer(contract.lecturer_id).await?;
        let rate = match &lecturer {
            Some(l) => self.rates.resolve(&l.display_name, &l.email).await,
            None => None,
        };
        Ok(ContractView::new(
            contract,
            lecturer,
            rate,
            self.config.exchange_rate_khr,
            self.clock.today(),
        ))
    }

    /// Fetch a contract and check the caller may see it.
    ///
    /// A missing contract is `NotFound`; one outside the caller's scope is `Forbidden`.
    pub(crate) async fn load_visible(&self, caller: &Caller, id: Id) -> StaffingResult<TeachingContract> {
        let contract = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| StaffingError::not_found(TeachingContract::TYPE_NAME, id))?;

        let visible = match caller.scope() {
            ContractScope::All => true,
            ContractScope::Lecturer(lecturer_id) => contract.lecturer_id == lecturer_id,
            ContractScope::Department(department_id) => self
                .store
                .departments_of(contract.id)
                .await?
                .contains(&department_id),
            ContractScope::Nothing => false,
        };

        if visible {
            Ok(contract)
        } else {
            Err(StaffingError::forbidden(format!(
                "contract {} is outside your scope",
                id
            )))
        }
    }

    pub(crate) fn require_admin(caller: &Caller, action: &str) -> StaffingResult<()> {
        if caller.is_admin() {
            Ok(())
        } else {
            Err(StaffingError::forbidden(format!(
                "{} may not {}",
                caller.role, action
            )))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[tokio::test]
    async fn test_detail_carries_financial_summary() {
        let h = Harness::new().await;
        let contract = h.draft().await;

        let view = h.service.detail(&lecturer(), contract.id).await.unwrap();
        assert_eq!(view.total_hours, 40);
        assert_eq!(view.hourly_rate, Some(Decimal::from(25)));
        assert_eq!(view.total_usd, Some(Decimal::from(1000)));
        assert_eq!(view.display_status, DisplayStatus::WaitingLecturer);
        assert_eq!(view.lecturer.map(|l| l.id), Some(LECTURER));
    }

    #[tokio::test]
    async fn test_detail_without_rate_is_blank() {
        let h = Harness::new().await;
        let contract = h.draft_with(OTHER_LECTURER, COURSE, 12).await;

        let view = h.service.detail(&superadmin(), contract.id).await.unwrap();
        assert_eq!(view.total_hours, 12);
        assert_eq!(view.hourly_rate, None);
        assert_eq!(view.total_usd, None);
    }

    #[tokio::test]
    async fn test_rate_is_resolved_on_every_read() {
        let h = Harness::new().await;
        let contract = h.draft_with(OTHER_LECTURER, COURSE, 12).await;
        assert_eq!(h.service.detail(&admin(), contract.id).await.unwrap().hourly_rate, None);

        h.candidates
            .add(staffing_models::CandidateRecord {
                id: 2,
                full_name: "chan  sophea".to_string(),
                email: None,
                hourly_rate: Some("$30".to_string()),
            })
            .await;

        let view = h.service.detail(&admin(), contract.id).await.unwrap();
        assert_eq!(view.hourly_rate, Some(Decimal::from(30)));
        assert_eq!(view.total_usd, Some(Decimal::from(360)));
    }

    #[tokio::test]
    async fn test_past_end_date_projects_contract_ended() {
        let h = Harness::new().await;
        let mut body = draft_body(LECTURER, COURSE, 40);
        body.start_date = Some("2025-06-01".to_string());
        body.end_date = Some("2025-09-30".to_string());
        let contract = h.service.create(&admin(), &body).await.unwrap();
        assert!(contract.end_date < Some(today()));

        let view = h.service.detail(&admin(), contract.id).await.unwrap();
        assert_eq!(view.display_status, DisplayStatus::ContractEnded);
    }

    #[tokio::test]
    async fn test_missing_is_not_found_and_foreign_is_forbidden() {
        let h = Harness::new().await;
        let contract = h.draft().await;

        let err = h.service.detail(&admin(), 999).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = h.service.detail(&foreign_admin(), contract.id).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        let err = h.service.detail(&other_lecturer(), contract.id).await.unwrap_err();
        assert_eq!(err.status_code(), 403);

        assert!(h.service.detail(&management(), contract.id).await.is_ok());
        assert!(h.service.detail(&superadmin(), contract.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_department_scope_without_department_sees_nothing() {
        let h = Harness::new().await;
        let contract = h.draft().await;
        let caller = Caller::new(5, staffing_models::CallerRole::Management, None);

        let err = h.service.detail(&caller, contract.id).await.unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_view_serializes_flat() {
        let h = Harness::new().await;
        let contract = h.draft().await;
        let view = h.service.detail(&admin(), contract.id).await.unwrap();

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["id"], contract.id);
        assert_eq!(json["status"], "DRAFT");
        assert_eq!(json["displayStatus"], "WAITING_LECTURER");
        assert_eq!(json["totalHours"], 40);
        assert_eq!(json["lineItems"].as_array().map(Vec::len), Some(1));
    }
}
