//! Document rendering
//!
//! The whole pipeline runs on its own task: a client that disconnects
//! abandons the response, not the render, and the cached document is still
//! updated. The engine call alone is bounded by the render timeout.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use staffing_core::error::StaffingError;
use staffing_core::result::StaffingResult;
use staffing_core::traits::Id;
use staffing_documents::{
    document_key, render_with_timeout, ContractDocument, ContractFigures, DocumentRenderer,
    SignatureImage, TemplateSet,
};
use staffing_models::{Caller, RenderedDocument, SignerRole, TeachingContract};
use tracing::{error, info, instrument, warn};

use super::ContractService;

/// A freshly rendered contract PDF
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub contract_id: Id,
    pub bytes: Bytes,
    pub generated_at: DateTime<Utc>,
}

impl RenderedPdf {
    pub fn filename(&self) -> String {
        format!("teaching-contract-{}.pdf", self.contract_id)
    }
}

impl ContractService {
    /// Render the bilingual PDF, store it and record it on the contract
    pub async fn render(&self, caller: &Caller, id: Id) -> StaffingResult<RenderedPdf> {
        let contract = self.load_visible(caller, id).await?;

        let this = self.clone();
        let task = tokio::spawn(async move { this.render_contract(contract).await });
        match task.await {
            Ok(result) => result,
            Err(e) => {
                error!(contract_id = id, error = %e, "Render task failed");
                Err(StaffingError::RenderEngine {
                    contract_id: id,
                    message: e.to_string(),
                })
            }
        }
    }

    #[instrument(skip(self, contract), fields(contract_id = contract.id))]
    async fn render_contract(&self, contract: TeachingContract) -> StaffingResult<RenderedPdf> {
        let id = contract.id;
        let lecturer = self
            .lecturers
            .find_lecturer(contract.lecturer_id)
            .await?
            .ok_or_else(|| StaffingError::not_found("Lecturer", contract.lecturer_id))?;

        let rate = self.rates.resolve(&lecturer.display_name, &lecturer.email).await;
        let figures = ContractFigures::compute(contract.total_hours(), rate, self.config.exchange_rate_khr);

        let templates = TemplateSet::load(&self.config.template_dir)
            .await
            .map_err(|e| template_error(id, e))?;
        let document = ContractDocument {
            contract: &contract,
            lecturer: &lecturer,
            figures,
            lecturer_signature: self.signature_image(&contract, SignerRole::Lecturer).await,
            management_signature: self.signature_image(&contract, SignerRole::Management).await,
            issued_on: self.clock.today(),
        };
        let html = DocumentRenderer::new(templates)
            .render_html(&document)
            .map_err(|e| template_error(id, e))?;

        let pdf = render_with_timeout(self.engine.clone(), html, self.config.render_timeout)
            .await
            .map_err(|e| {
                error!(contract_id = id, engine = self.engine.name(), error = %e, "PDF engine failed");
                StaffingError::RenderEngine {
                    contract_id: id,
                    message: e.to_string(),
                }
            })?;

        let key = document_key(id);
        self.storage.put(&key, pdf.clone()).await?;
        let generated_at = self.clock.now();
        self.store
            .set_rendered_document(
                id,
                RenderedDocument {
                    path: key,
                    generated_at,
                },
            )
            .await?;

        info!(contract_id = id, size = pdf.len(), rate_known = figures.rate_known(), "Contract rendered");
        Ok(RenderedPdf {
            contract_id: id,
            bytes: pdf,
            generated_at,
        })
    }

    /// Stored image for `role`; an unreadable blob renders as an empty block
    async fn signature_image(&self, contract: &TeachingContract, role: SignerRole) -> Option<SignatureImage> {
        let artifact = contract.signature(role)?;
        match self.storage.get(&artifact.path).await {
            Ok(data) => {
                let image = SignatureImage::from_stored(data);
                if image.is_none() {
                    warn!(contract_id = contract.id, path = %artifact.path, "Stored signature is not a known image");
                }
                image
            }
            Err(e) => {
                warn!(contract_id = contract.id, path = %artifact.path, error = %e, "Signature image unavailable");
                None
            }
        }
    }
}

fn template_error(contract_id: Id, err: staffing_documents::TemplateError) -> StaffingError {
    error!(contract_id, error = %err, "Contract template failed");
    StaffingError::RenderTemplate {
        contract_id,
        message: err.to_string(),
    }
}
