//! Store and directory traits
//!
//! Every trait has a Postgres implementation and an in-memory one; services
//! only ever see the trait objects.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use staffing_core::error::{StaffingError, StateError};
use staffing_core::pagination::{Page, PageRequest};
use staffing_core::traits::Id;
use staffing_models::{
    CandidateRecord, ContractFilters, ContractScope, ContractStatus, LecturerSummary,
    NewTeachingContract, RenderedDocument, SignatureArtifact, SignerRole, TeachingContract,
};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    InvalidState(#[from] StateError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt row: {0}")]
    Decode(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        RepositoryError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<RepositoryError> for StaffingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => StaffingError::NotFound { entity, id },
            RepositoryError::InvalidState(state) => StaffingError::InvalidState(state),
            RepositoryError::Database(e) => StaffingError::Database(e.to_string()),
            RepositoryError::Decode(message) => StaffingError::Database(message),
        }
    }
}

/// Result of a guarded signature write
#[derive(Debug, Clone)]
pub struct SignatureOutcome {
    pub previous_status: ContractStatus,
    pub contract: TeachingContract,
    /// Artifact that the new signature replaced, if the role had signed before
    pub replaced: Option<SignatureArtifact>,
}

/// Persisted contracts and their line items
#[async_trait]
pub trait TeachingContractStore: Send + Sync {
    /// Insert header and line items in one transaction.
    ///
    /// Fails with `NotFound` when the lecturer, a course or a class does not
    /// exist; nothing is written in that case.
    async fn create(
        &self,
        contract: NewTeachingContract,
        now: DateTime<Utc>,
    ) -> RepositoryResult<TeachingContract>;

    async fn find(&self, id: Id) -> RepositoryResult<Option<TeachingContract>>;

    /// One page of contracts visible in `scope`, newest first
    async fn list(
        &self,
        scope: ContractScope,
        filters: &ContractFilters,
        today: NaiveDate,
        page: PageRequest,
    ) -> RepositoryResult<Page<TeachingContract>>;

    /// Departments of the courses referenced by a contract's line items
    async fn departments_of(&self, contract_id: Id) -> RepositoryResult<Vec<Id>>;

    /// Record a signature and advance the status under a row lock.
    ///
    /// Fails with `StateError::AlreadyCompleted` when the contract is completed.
    async fn apply_signature(
        &self,
        id: Id,
        role: SignerRole,
        artifact: SignatureArtifact,
    ) -> RepositoryResult<SignatureOutcome>;

    /// Overwrite the persisted status; signature artifacts are untouched
    async fn set_status(
        &self,
        id: Id,
        status: ContractStatus,
        now: DateTime<Utc>,
    ) -> RepositoryResult<TeachingContract>;

    async fn set_rendered_document(&self, id: Id, document: RenderedDocument) -> RepositoryResult<()>;

    /// Delete a DRAFT contract and its line items; returns what was deleted.
    ///
    /// Any other status fails with `StateError::NotDraft` and leaves every row in place.
    async fn delete_draft(&self, id: Id) -> RepositoryResult<TeachingContract>;
}

/// Lecturer identities (owned by the identity subsystem)
#[async_trait]
pub trait LecturerDirectory: Send + Sync {
    async fn find_lecturer(&self, id: Id) -> RepositoryResult<Option<LecturerSummary>>;

    async fn find_lecturers(&self, ids: &[Id]) -> RepositoryResult<Vec<LecturerSummary>>;
}

/// Hiring candidates (owned by the recruitment subsystem)
#[async_trait]
pub trait CandidateDirectory: Send + Sync {
    /// Lowest-id candidate whose trimmed, whitespace-collapsed full name
    /// equals `normalized_name` case-insensitively
    async fn find_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> RepositoryResult<Option<CandidateRecord>>;

    /// Lowest-id candidate with exactly this email
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<CandidateRecord>>;
}
