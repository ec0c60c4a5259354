//! Create a DRAFT contract

use staffing_core::result::StaffingResult;
use staffing_models::{Caller, TeachingContract};
use staffing_validation::{ContractDraft, CreateContractValidation};
use tracing::info;

use super::ContractService;

impl ContractService {
    /// Validate the draft and persist header plus line items atomically.
    ///
    /// Admin and superadmin only. A missing lecturer, course or class is `NotFound`.
    pub async fn create(&self, caller: &Caller, draft: &ContractDraft) -> StaffingResult<TeachingContract> {
        Self::require_admin(caller, "create contracts")?;

        let new_contract = CreateContractValidation::new(caller).validate(draft)?;
        let contract = self.store.create(new_contract, self.clock.now()).await?;

        info!(
            contract_id = contract.id,
            lecturer_id = contract.lecturer_id,
            line_items = contract.line_items.len(),
            created_by = caller.id,
            "Teaching contract created"
        );
        Ok(contract)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use staffing_models::ContractStatus;
    use staffing_validation::LineItemDraft;

    #[tokio::test]
    async fn test_create_persists_draft() {
        let h = Harness::new().await;
        let contract = h.service.create(&admin(), &draft_body(LECTURER, COURSE, 40)).await.unwrap();

        assert_eq!(contract.status, ContractStatus::Draft);
        assert_eq!(contract.created_by, admin().id);
        assert_eq!(contract.total_hours(), 40);
        assert_eq!(contract.line_items[0].term, "Term 1");
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_only_admins_create() {
        let h = Harness::new().await;
        for caller in [management(), lecturer()] {
            let err = h
                .service
                .create(&caller, &draft_body(LECTURER, COURSE, 40))
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), 403);
        }
        assert!(h
            .service
            .create(&superadmin(), &draft_body(LECTURER, COURSE, 40))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_empty_courses_is_validation_error() {
        let h = Harness::new().await;
        let mut body = draft_body(LECTURER, COURSE, 40);
        body.courses.clear();

        let err = h.service.create(&admin(), &body).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_one_bad_line_item_rejects_all() {
        let h = Harness::new().await;
        let mut body = draft_body(LECTURER, COURSE, 10);
        for hours in [20, 30] {
            body.courses.push(LineItemDraft {
                course_id: 101,
                class_id: None,
                course_name: "Networks".to_string(),
                hours: Some(hours),
            });
        }
        body.courses.push(LineItemDraft {
            course_id: 101,
            class_id: None,
            course_name: "Networks".to_string(),
            hours: Some(-1),
        });

        let err = h.service.create(&admin(), &body).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(h.store.is_empty().await);
        assert_eq!(h.store.line_item_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_references_are_not_found() {
        let h = Harness::new().await;

        let err = h.service.create(&admin(), &draft_body(999, COURSE, 40)).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = h.service.create(&admin(), &draft_body(LECTURER, 555, 40)).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let mut body = draft_body(LECTURER, COURSE, 40);
        body.courses[0].class_id = Some(999);
        let err = h.service.create(&admin(), &body).await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        assert!(h.store.is_empty().await);
    }
}
