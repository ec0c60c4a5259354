//! Draft deletion

use staffing_core::result::StaffingResult;
use staffing_core::traits::Id;
use staffing_documents::document_key;
use staffing_models::{Caller, SignerRole};
use staffing_validation::DeleteContractValidation;
use tracing::{info, warn};

use super::ContractService;

impl ContractService {
    /// Delete a DRAFT contract, then its blobs.
    ///
    /// The row lock in the store decides; the early status check only saves
    /// a round trip. Blob removal failures are logged and never surfaced.
    pub async fn delete(&self, caller: &Caller, id: Id) -> StaffingResult<()> {
        Self::require_admin(caller, "delete contracts")?;
        let contract = self.load_visible(caller, id).await?;
        DeleteContractValidation::validate(&contract)?;

        let deleted = self.store.delete_draft(id).await?;

        let mut keys: Vec<String> = [SignerRole::Lecturer, SignerRole::Management]
            .into_iter()
            .filter_map(|role| deleted.signature(role).map(|s| s.path.clone()))
            .collect();
        keys.push(document_key(id));
        for key in keys {
            if let Err(e) = self.storage.delete(&key).await {
                warn!(contract_id = id, path = %key, error = %e, "Failed to remove contract blob");
            }
        }

        info!(contract_id = id, caller_id = caller.id, "Draft contract deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use bytes::Bytes;
    use staffing_documents::Storage;
    use staffing_models::ContractStatus;

    #[tokio::test]
    async fn test_delete_draft_removes_rows_and_pdf() {
        let h = Harness::new().await;
        let contract = h.draft().await;
        h.service.render(&admin(), contract.id).await.unwrap();

        h.service.delete(&admin(), contract.id).await.unwrap();
        assert!(h.store.find(contract.id).await.unwrap().is_none());
        assert_eq!(h.store.line_item_count().await, 0);
        assert!(!h.storage.exists(&document_key(contract.id)).await.unwrap());
    }

    #[tokio::test]
    async fn test_signed_contract_cannot_be_deleted() {
        let h = Harness::new().await;
        let contract = h.draft().await;
        h.service
            .submit_signature(
                &lecturer(),
                contract.id,
                Some("lecturer"),
                Some(super::super::SignatureUpload {
                    content_type: Some("image/png".to_string()),
                    filename: None,
                    data: Bytes::from_static(PNG),
                }),
            )
            .await
            .unwrap();

        let err = h.service.delete(&admin(), contract.id).await.unwrap_err();
        assert_eq!(err.status_code(), 409);

        let stored = h.store.find(contract.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ContractStatus::LecturerSigned);
        assert_eq!(stored.line_items.len(), 1);
        assert!(h
            .storage
            .exists(&stored.lecturer_signature.unwrap().path)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_delete_requires_admin_in_scope() {
        let h = Harness::new().await;
        let contract = h.draft().await;

        for caller in [management(), lecturer(), foreign_admin()] {
            let err = h.service.delete(&caller, contract.id).await.unwrap_err();
            assert_eq!(err.status_code(), 403);
        }
        let err = h.service.delete(&admin(), 999).await.unwrap_err();
        assert_eq!(err.status_code(), 404);
        assert_eq!(h.store.len().await, 1);
    }
}
