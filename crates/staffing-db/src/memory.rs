//! In-memory stores
//!
//! Same contract as the Postgres implementations, including the NotFound
//! checks on create and the status guard on signing. A single write lock is
//! held across each check-then-write.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use staffing_core::error::StateError;
use staffing_core::pagination::{Page, PageRequest};
use staffing_core::traits::Id;
use staffing_models::{
    CandidateRecord, ContractFilters, ContractLineItem, ContractScope, ContractStatus, Entity,
    LecturerSummary, NewTeachingContract, RenderedDocument, SignatureArtifact, SignerRole,
    TeachingContract,
};
use tokio::sync::RwLock;

use crate::repository::{
    CandidateDirectory, LecturerDirectory, RepositoryError, RepositoryResult, SignatureOutcome,
    TeachingContractStore,
};

#[derive(Default)]
struct State {
    next_contract_id: Id,
    next_line_item_id: Id,
    contracts: BTreeMap<Id, TeachingContract>,
    /// course id -> department id
    courses: HashMap<Id, Option<Id>>,
    classes: HashSet<Id>,
    lecturers: HashMap<Id, LecturerSummary>,
}

impl State {
    fn visible(&self, contract: &TeachingContract, scope: ContractScope) -> bool {
        match scope {
            ContractScope::All => true,
            ContractScope::Lecturer(id) => contract.lecturer_id == id,
            ContractScope::Department(department_id) => contract
                .line_items
                .iter()
                .any(|item| self.courses.get(&item.course_id) == Some(&Some(department_id))),
            ContractScope::Nothing => false,
        }
    }

    fn matches_search(&self, contract: &TeachingContract, search: &str) -> bool {
        self.lecturers
            .get(&contract.lecturer_id)
            .map(|lecturer| lecturer.matches_query(search))
            .unwrap_or(false)
    }

    fn contract_mut(&mut self, id: Id) -> RepositoryResult<&mut TeachingContract> {
        self.contracts
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::not_found(TeachingContract::TYPE_NAME, id))
    }
}

/// In-memory [`TeachingContractStore`] and [`LecturerDirectory`]
#[derive(Default)]
pub struct MemoryContractStore {
    state: RwLock<State>,
}

impl MemoryContractStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_course(&self, course_id: Id, department_id: Option<Id>) {
        self.state.write().await.courses.insert(course_id, department_id);
    }

    pub async fn add_class(&self, class_id: Id) {
        self.state.write().await.classes.insert(class_id);
    }

    pub async fn add_lecturer(&self, lecturer: LecturerSummary) {
        self.state.write().await.lecturers.insert(lecturer.id, lecturer);
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.contracts.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Line items across all contracts
    pub async fn line_item_count(&self) -> usize {
        self.state
            .read()
            .await
            .contracts
            .values()
            .map(|c| c.line_items.len())
            .sum()
    }
}

#[async_trait]
impl TeachingContractStore for MemoryContractStore {
    async fn create(
        &self,
        contract: NewTeachingContract,
        now: DateTime<Utc>,
    ) -> RepositoryResult<TeachingContract> {
        let mut state = self.state.write().await;

        if !state.lecturers.contains_key(&contract.lecturer_id) {
            return Err(RepositoryError::not_found("Lecturer", contract.lecturer_id));
        }
        for item in &contract.line_items {
            if !state.courses.contains_key(&item.course_id) {
                return Err(RepositoryError::not_found("Course", item.course_id));
            }
            if let Some(class_id) = item.class_id {
                if !state.classes.contains(&class_id) {
                    return Err(RepositoryError::not_found("Class", class_id));
                }
            }
        }

        state.next_contract_id += 1;
        let id = state.next_contract_id;

        let mut line_items = Vec::with_capacity(contract.line_items.len());
        for item in contract.line_items {
            state.next_line_item_id += 1;
            line_items.push(ContractLineItem {
                id: state.next_line_item_id,
                contract_id: id,
                course_id: item.course_id,
                class_id: item.class_id,
                course_name: item.course_name,
                year_level: contract.year_level.clone(),
                term: contract.term.clone(),
                academic_year: contract.academic_year.clone(),
                hours: item.hours,
            });
        }

        let stored = TeachingContract {
            id,
            lecturer_id: contract.lecturer_id,
            created_by: contract.created_by,
            academic_year: contract.academic_year,
            term: contract.term,
            year_level: contract.year_level,
            start_date: contract.start_date,
            end_date: contract.end_date,
            status: ContractStatus::Draft,
            lecturer_signature: None,
            management_signature: None,
            rendered_document: None,
            created_at: now,
            updated_at: now,
            line_items,
        };
        state.contracts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<TeachingContract>> {
        Ok(self.state.read().await.contracts.get(&id).cloned())
    }

    async fn list(
        &self,
        scope: ContractScope,
        filters: &ContractFilters,
        today: NaiveDate,
        page: PageRequest,
    ) -> RepositoryResult<Page<TeachingContract>> {
        let state = self.state.read().await;

        let mut matching: Vec<&TeachingContract> = state
            .contracts
            .values()
            .filter(|c| state.visible(c, scope))
            .filter(|c| filters.academic_year.as_ref().map_or(true, |y| &c.academic_year == y))
            .filter(|c| filters.term.as_ref().map_or(true, |t| &c.term == t))
            .filter(|c| {
                filters
                    .status
                    .map_or(true, |f| f.matches(c.status, c.end_date, today))
            })
            .filter(|c| {
                filters
                    .search
                    .as_deref()
                    .map_or(true, |q| state.matches_search(c, q))
            })
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset().max(0) as usize)
            .take(page.limit().max(0) as usize)
            .cloned()
            .collect();

        Ok(Page::new(items, total, page))
    }

    async fn departments_of(&self, contract_id: Id) -> RepositoryResult<Vec<Id>> {
        let state = self.state.read().await;
        let contract = match state.contracts.get(&contract_id) {
            Some(contract) => contract,
            None => return Ok(Vec::new()),
        };

        let mut departments: Vec<Id> = contract
            .line_items
            .iter()
            .filter_map(|item| state.courses.get(&item.course_id).copied().flatten())
            .collect();
        departments.sort_unstable();
        departments.dedup();
        Ok(departments)
    }

    async fn apply_signature(
        &self,
        id: Id,
        role: SignerRole,
        artifact: SignatureArtifact,
    ) -> RepositoryResult<SignatureOutcome> {
        let mut state = self.state.write().await;
        let contract = state.contract_mut(id)?;

        let previous_status = contract.status;
        let next = previous_status
            .after_signature(role)
            .ok_or(StateError::AlreadyCompleted { contract_id: id })?;

        let signed_at = artifact.signed_at;
        let replaced = match role {
            SignerRole::Lecturer => contract.lecturer_signature.replace(artifact),
            SignerRole::Management => contract.management_signature.replace(artifact),
        };
        contract.status = next;
        contract.updated_at = signed_at;

        Ok(SignatureOutcome {
            previous_status,
            contract: contract.clone(),
            replaced,
        })
    }

    async fn set_status(
        &self,
        id: Id,
        status: ContractStatus,
        now: DateTime<Utc>,
    ) -> RepositoryResult<TeachingContract> {
        let mut state = self.state.write().await;
        let contract = state.contract_mut(id)?;
        contract.status = status;
        contract.updated_at = now;
        Ok(contract.clone())
    }

    async fn set_rendered_document(&self, id: Id, document: RenderedDocument) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        state.contract_mut(id)?.rendered_document = Some(document);
        Ok(())
    }

    async fn delete_draft(&self, id: Id) -> RepositoryResult<TeachingContract> {
        let mut state = self.state.write().await;
        let status = state.contract_mut(id)?.status;
        if !status.is_draft() {
            return Err(StateError::NotDraft {
                contract_id: id,
                status: status.to_string(),
            }
            .into());
        }
        state
            .contracts
            .remove(&id)
            .ok_or_else(|| RepositoryError::not_found(TeachingContract::TYPE_NAME, id))
    }
}

#[async_trait]
impl LecturerDirectory for MemoryContractStore {
    async fn find_lecturer(&self, id: Id) -> RepositoryResult<Option<LecturerSummary>> {
        Ok(self.state.read().await.lecturers.get(&id).cloned())
    }

    async fn find_lecturers(&self, ids: &[Id]) -> RepositoryResult<Vec<LecturerSummary>> {
        let state = self.state.read().await;
        let mut found: Vec<LecturerSummary> = ids
            .iter()
            .filter_map(|id| state.lecturers.get(id).cloned())
            .collect();
        found.sort_by_key(|l| l.id);
        found.dedup_by_key(|l| l.id);
        Ok(found)
    }
}

/// In-memory [`CandidateDirectory`]
#[derive(Default)]
pub struct MemoryCandidateDirectory {
    candidates: RwLock<Vec<CandidateRecord>>,
    /// When set, every lookup fails with this message
    failure: RwLock<Option<String>>,
}

impl MemoryCandidateDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, candidate: CandidateRecord) {
        let mut candidates = self.candidates.write().await;
        candidates.push(candidate);
        candidates.sort_by_key(|c| c.id);
    }

    /// Make every subsequent lookup fail
    pub async fn fail_with(&self, message: impl Into<String>) {
        *self.failure.write().await = Some(message.into());
    }

    async fn check_failure(&self) -> RepositoryResult<()> {
        match self.failure.read().await.as_ref() {
            Some(message) => Err(RepositoryError::Decode(message.clone())),
            None => Ok(()),
        }
    }
}

fn fold_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

#[async_trait]
impl CandidateDirectory for MemoryCandidateDirectory {
    async fn find_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> RepositoryResult<Option<CandidateRecord>> {
        self.check_failure().await?;
        let wanted = normalized_name.to_lowercase();
        Ok(self
            .candidates
            .read()
            .await
            .iter()
            .find(|c| fold_name(&c.full_name) == wanted)
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<CandidateRecord>> {
        self.check_failure().await?;
        Ok(self
            .candidates
            .read()
            .await
            .iter()
            .find(|c| c.email.as_deref() == Some(email))
            .cloned())
    }
}
