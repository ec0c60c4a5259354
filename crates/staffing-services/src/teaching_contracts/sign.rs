//! Signature intake

use bytes::Bytes;
use staffing_core::error::{StaffingError, StateError};
use staffing_core::result::StaffingResult;
use staffing_core::traits::Id;
use staffing_documents::{sha256_hex, signature_key, SignaturePolicy};
use staffing_models::{Caller, SignatureArtifact, SignerRole, TeachingContract};
use staffing_validation::SignatureValidation;
use tracing::{info, warn};

use super::ContractService;

/// The file part of a signature upload
#[derive(Debug, Clone)]
pub struct SignatureUpload {
    pub content_type: Option<String>,
    pub filename: Option<String>,
    pub data: Bytes,
}

impl ContractService {
    /// Store a signature image for `who` and advance the contract status.
    ///
    /// The image is written under a content-addressed key before the guarded
    /// status update. When the guard rejects the signature, the new blob is
    /// removed unless some contract signature already points at it.
    /// The cached PDF is not re-rendered.
    pub async fn submit_signature(
        &self,
        caller: &Caller,
        id: Id,
        who: Option<&str>,
        upload: Option<SignatureUpload>,
    ) -> StaffingResult<TeachingContract> {
        let role = SignatureValidation::validate(who, upload.as_ref().map(|u| u.data.len()))?;
        let upload = upload.ok_or_else(|| StaffingError::Internal("validated upload went missing".into()))?;

        let contract = self.load_visible(caller, id).await?;
        if caller.is_lecturer() && role != SignerRole::Lecturer {
            return Err(StaffingError::forbidden("lecturers may only sign as lecturer"));
        }
        if contract.status.is_terminal() {
            return Err(StateError::AlreadyCompleted { contract_id: id }.into());
        }

        let image = SignaturePolicy::new(self.config.signature_max_bytes).inspect(
            upload.content_type.as_deref(),
            upload.filename.as_deref(),
            upload.data,
        )?;

        let key = signature_key(id, role, &sha256_hex(&image.data), image.kind.extension());
        self.storage.put(&key, image.data).await?;

        let artifact = SignatureArtifact {
            path: key.clone(),
            signed_at: self.clock.now(),
        };
        let outcome = match self.store.apply_signature(id, role, artifact).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.discard_unreferenced(id, &key).await;
                return Err(e.into());
            }
        };

        if let Some(replaced) = outcome.replaced.filter(|old| old.path != key) {
            if let Err(e) = self.storage.delete(&replaced.path).await {
                warn!(contract_id = id, path = %replaced.path, error = %e, "Failed to remove replaced signature");
            }
        }

        info!(
            contract_id = id,
            role = %role,
            from = %outcome.previous_status,
            to = %outcome.contract.status,
            "Signature recorded"
        );
        Ok(outcome.contract)
    }

    async fn discard_unreferenced(&self, id: Id, key: &str) {
        let referenced = match self.store.find(id).await {
            Ok(Some(current)) => [SignerRole::Lecturer, SignerRole::Management]
                .into_iter()
                .any(|role| current.signature(role).map(|s| s.path.as_str()) == Some(key)),
            Ok(None) => false,
            Err(e) => {
                warn!(contract_id = id, error = %e, "Could not check signature references, keeping blob");
                true
            }
        };
        if referenced {
            return;
        }
        if let Err(e) = self.storage.delete(key).await {
            warn!(contract_id = id, path = %key, error = %e, "Failed to remove rejected signature");
        }
    }
}
