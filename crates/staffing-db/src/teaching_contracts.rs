//! Teaching contracts repository
//!
//! Tables: teaching_contracts, teaching_contract_courses

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use staffing_core::error::StateError;
use staffing_core::pagination::{Page, PageRequest};
use staffing_core::traits::Id;
use staffing_models::{
    ContractFilters, ContractLineItem, ContractScope, ContractStatus, DisplayStatus, Entity,
    NewTeachingContract, RenderedDocument, SignatureArtifact, SignerRole, StatusFilter,
    TeachingContract,
};

use crate::repository::{RepositoryError, RepositoryResult, SignatureOutcome, TeachingContractStore};

const CONTRACT_COLUMNS: &str = "tc.id, tc.lecturer_id, tc.created_by, tc.academic_year, tc.term, \
     tc.year_level, tc.start_date, tc.end_date, tc.status, \
     tc.lecturer_signature_path, tc.lecturer_signed_at, \
     tc.management_signature_path, tc.management_signed_at, \
     tc.pdf_path, tc.pdf_generated_at, tc.created_at, tc.updated_at";

const LINE_ITEM_COLUMNS: &str = "id, contract_id, course_id, class_id, course_name, year_level, \
     term, academic_year, hours";

/// Contract header row
#[derive(Debug, Clone, FromRow)]
pub struct ContractRow {
    pub id: i64,
    pub lecturer_id: i64,
    pub created_by: i64,
    pub academic_year: String,
    pub term: String,
    pub year_level: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub lecturer_signature_path: Option<String>,
    pub lecturer_signed_at: Option<DateTime<Utc>>,
    pub management_signature_path: Option<String>,
    pub management_signed_at: Option<DateTime<Utc>>,
    pub pdf_path: Option<String>,
    pub pdf_generated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item row
#[derive(Debug, Clone, FromRow)]
pub struct LineItemRow {
    pub id: i64,
    pub contract_id: i64,
    pub course_id: i64,
    pub class_id: Option<i64>,
    pub course_name: String,
    pub year_level: Option<String>,
    pub term: String,
    pub academic_year: String,
    pub hours: i32,
}

impl ContractRow {
    pub fn status(&self) -> RepositoryResult<ContractStatus> {
        self.status.parse().map_err(|_| {
            RepositoryError::Decode(format!(
                "teaching_contracts.status '{}' on contract {}",
                self.status, self.id
            ))
        })
    }

    pub fn into_contract(self, items: Vec<LineItemRow>) -> RepositoryResult<TeachingContract> {
        let status = self.status()?;
        Ok(TeachingContract {
            id: self.id,
            lecturer_id: self.lecturer_id,
            created_by: self.created_by,
            academic_year: self.academic_year,
            term: self.term,
            year_level: self.year_level,
            start_date: self.start_date,
            end_date: self.end_date,
            status,
            lecturer_signature: artifact(self.lecturer_signature_path, self.lecturer_signed_at),
            management_signature: artifact(
                self.management_signature_path,
                self.management_signed_at,
            ),
            rendered_document: self
                .pdf_path
                .zip(self.pdf_generated_at)
                .map(|(path, generated_at)| RenderedDocument { path, generated_at }),
            created_at: self.created_at,
            updated_at: self.updated_at,
            line_items: items.into_iter().map(LineItemRow::into_line_item).collect(),
        })
    }
}

impl LineItemRow {
    pub fn into_line_item(self) -> ContractLineItem {
        ContractLineItem {
            id: self.id,
            contract_id: self.contract_id,
            course_id: self.course_id,
            class_id: self.class_id,
            course_name: self.course_name,
            year_level: self.year_level,
            term: self.term,
            academic_year: self.academic_year,
            hours: self.hours,
        }
    }
}

fn artifact(path: Option<String>, signed_at: Option<DateTime<Utc>>) -> Option<SignatureArtifact> {
    path.zip(signed_at)
        .map(|(path, signed_at)| SignatureArtifact { path, signed_at })
}

/// Escape `%`, `_` and `\` for a literal ILIKE substring match
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Append scope and filter predicates. The builder must already end in a WHERE clause.
fn push_list_predicates(
    qb: &mut QueryBuilder<'_, Postgres>,
    scope: ContractScope,
    filters: &ContractFilters,
    today: NaiveDate,
) {
    match scope {
        ContractScope::All => {}
        ContractScope::Lecturer(lecturer_id) => {
            qb.push(" AND tc.lecturer_id = ").push_bind(lecturer_id);
        }
        ContractScope::Department(department_id) => {
            qb.push(
                " AND EXISTS (SELECT 1 FROM teaching_contract_courses tcc \
                 JOIN courses c ON c.id = tcc.course_id \
                 WHERE tcc.contract_id = tc.id AND c.department_id = ",
            )
            .push_bind(department_id)
            .push(")");
        }
        ContractScope::Nothing => {
            qb.push(" AND FALSE");
        }
    }

    if let Some(academic_year) = &filters.academic_year {
        qb.push(" AND tc.academic_year = ").push_bind(academic_year.clone());
    }
    if let Some(term) = &filters.term {
        qb.push(" AND tc.term = ").push_bind(term.clone());
    }

    match filters.status {
        None => {}
        Some(StatusFilter::Persisted(status)) => {
            qb.push(" AND tc.status = ").push_bind(status.as_str());
        }
        Some(StatusFilter::Display(DisplayStatus::ContractEnded)) => {
            qb.push(" AND tc.end_date IS NOT NULL AND tc.end_date < ")
                .push_bind(today);
        }
        Some(StatusFilter::Display(display)) => {
            let statuses: Vec<String> = ContractStatus::projecting_to(display)
                .iter()
                .map(|s| s.as_str().to_string())
                .collect();
            qb.push(" AND tc.status = ANY(")
                .push_bind(statuses)
                .push(") AND (tc.end_date IS NULL OR tc.end_date >= ")
                .push_bind(today)
                .push(")");
        }
    }

    if let Some(search) = &filters.search {
        let pattern = like_pattern(search);
        qb.push(" AND (u.display_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR u.email ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn list_query<'a>(
    scope: ContractScope,
    filters: &ContractFilters,
    today: NaiveDate,
    page: PageRequest,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!(
        "SELECT {} FROM teaching_contracts tc LEFT JOIN users u ON u.id = tc.lecturer_id WHERE TRUE",
        CONTRACT_COLUMNS
    ));
    push_list_predicates(&mut qb, scope, filters, today);
    qb.push(" ORDER BY tc.created_at DESC, tc.id DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    qb
}

fn count_query<'a>(
    scope: ContractScope,
    filters: &ContractFilters,
    today: NaiveDate,
) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT COUNT(*) FROM teaching_contracts tc LEFT JOIN users u ON u.id = tc.lecturer_id WHERE TRUE",
    );
    push_list_predicates(&mut qb, scope, filters, today);
    qb
}

/// Postgres-backed [`TeachingContractStore`]
#[derive(Clone)]
pub struct PgContractStore {
    pool: PgPool,
}

impl PgContractStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_line_items(&self, contract_ids: &[Id]) -> RepositoryResult<Vec<LineItemRow>> {
        if contract_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, LineItemRow>(&format!(
            "SELECT {} FROM teaching_contract_courses WHERE contract_id = ANY($1) ORDER BY contract_id, id",
            LINE_ITEM_COLUMNS
        ))
        .bind(contract_ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn lock_row(tx: &mut Transaction<'_, Postgres>, id: Id) -> RepositoryResult<ContractRow> {
        sqlx::query_as::<_, ContractRow>(&format!(
            "SELECT {} FROM teaching_contracts tc WHERE tc.id = $1 FOR UPDATE",
            CONTRACT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| RepositoryError::not_found(TeachingContract::TYPE_NAME, id))
    }

    async fn require(&self, id: Id) -> RepositoryResult<TeachingContract> {
        self.find(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(TeachingContract::TYPE_NAME, id))
    }

    /// Fail with `NotFound` for the first referenced id missing from `table`
    async fn ensure_exist(
        tx: &mut Transaction<'_, Postgres>,
        table: &'static str,
        entity: &'static str,
        ids: &BTreeSet<Id>,
    ) -> RepositoryResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let found: Vec<i64> = sqlx::query_scalar(&format!("SELECT id FROM {} WHERE id = ANY($1)", table))
            .bind(ids.iter().copied().collect::<Vec<_>>())
            .fetch_all(&mut **tx)
            .await?;
        match ids.iter().find(|id| !found.contains(id)) {
            Some(missing) => Err(RepositoryError::not_found(entity, missing)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TeachingContractStore for PgContractStore {
    async fn create(
        &self,
        contract: NewTeachingContract,
        now: DateTime<Utc>,
    ) -> RepositoryResult<TeachingContract> {
        let mut tx = self.pool.begin().await?;

        let lecturer_exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(contract.lecturer_id)
                .fetch_one(&mut *tx)
                .await?;
        if !lecturer_exists {
            return Err(RepositoryError::not_found("Lecturer", contract.lecturer_id));
        }

        let course_ids: BTreeSet<Id> = contract.line_items.iter().map(|i| i.course_id).collect();
        let class_ids: BTreeSet<Id> = contract.line_items.iter().filter_map(|i| i.class_id).collect();
        Self::ensure_exist(&mut tx, "courses", "Course", &course_ids).await?;
        Self::ensure_exist(&mut tx, "classes", "Class", &class_ids).await?;

        let header = sqlx::query_as::<_, ContractRow>(&format!(
            r#"
            INSERT INTO teaching_contracts AS tc
                (lecturer_id, created_by, academic_year, term, year_level,
                 start_date, end_date, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING {}
            "#,
            CONTRACT_COLUMNS
        ))
        .bind(contract.lecturer_id)
        .bind(contract.created_by)
        .bind(&contract.academic_year)
        .bind(&contract.term)
        .bind(&contract.year_level)
        .bind(contract.start_date)
        .bind(contract.end_date)
        .bind(ContractStatus::Draft.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(contract.line_items.len());
        for item in &contract.line_items {
            let row = sqlx::query_as::<_, LineItemRow>(&format!(
                r#"
                INSERT INTO teaching_contract_courses
                    (contract_id, course_id, class_id, course_name, year_level, term, academic_year, hours)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {}
                "#,
                LINE_ITEM_COLUMNS
            ))
            .bind(header.id)
            .bind(item.course_id)
            .bind(item.class_id)
            .bind(&item.course_name)
            .bind(&contract.year_level)
            .bind(&contract.term)
            .bind(&contract.academic_year)
            .bind(item.hours)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        tx.commit().await?;

        tracing::debug!(
            contract_id = header.id,
            line_items = items.len(),
            "Teaching contract inserted"
        );
        header.into_contract(items)
    }

    async fn find(&self, id: Id) -> RepositoryResult<Option<TeachingContract>> {
        let row = sqlx::query_as::<_, ContractRow>(&format!(
            "SELECT {} FROM teaching_contracts tc WHERE tc.id = $1",
            CONTRACT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.load_line_items(&[row.id]).await?;
                Ok(Some(row.into_contract(items)?))
            }
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        scope: ContractScope,
        filters: &ContractFilters,
        today: NaiveDate,
        page: PageRequest,
    ) -> RepositoryResult<Page<TeachingContract>> {
        if scope == ContractScope::Nothing {
            return Ok(Page::new(Vec::new(), 0, page));
        }

        let mut count = count_query(scope, filters, today);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut query = list_query(scope, filters, today, page);
        let rows = query
            .build_query_as::<ContractRow>()
            .fetch_all(&self.pool)
            .await?;

        let ids: Vec<Id> = rows.iter().map(|row| row.id).collect();
        let mut items_by_contract: HashMap<Id, Vec<LineItemRow>> = HashMap::new();
        for item in self.load_line_items(&ids).await? {
            items_by_contract.entry(item.contract_id).or_default().push(item);
        }

        let contracts = rows
            .into_iter()
            .map(|row| {
                let items = items_by_contract.remove(&row.id).unwrap_or_default();
                row.into_contract(items)
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(Page::new(contracts, total, page))
    }

    async fn departments_of(&self, contract_id: Id) -> RepositoryResult<Vec<Id>> {
        let departments: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT c.department_id
            FROM teaching_contract_courses tcc
            JOIN courses c ON c.id = tcc.course_id
            WHERE tcc.contract_id = $1 AND c.department_id IS NOT NULL
            ORDER BY c.department_id
            "#,
        )
        .bind(contract_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(departments)
    }

    async fn apply_signature(
        &self,
        id: Id,
        role: SignerRole,
        signature: SignatureArtifact,
    ) -> RepositoryResult<SignatureOutcome> {
        let mut tx = self.pool.begin().await?;
        let row = Self::lock_row(&mut tx, id).await?;
        let previous_status = row.status()?;

        let next = previous_status
            .after_signature(role)
            .ok_or(StateError::AlreadyCompleted { contract_id: id })?;

        let replaced = match role {
            SignerRole::Lecturer => artifact(row.lecturer_signature_path.clone(), row.lecturer_signed_at),
            SignerRole::Management => {
                artifact(row.management_signature_path.clone(), row.management_signed_at)
            }
        };

        let sql = match role {
            SignerRole::Lecturer => {
                "UPDATE teaching_contracts SET status = $2, lecturer_signature_path = $3, \
                 lecturer_signed_at = $4, updated_at = $4 WHERE id = $1"
            }
            SignerRole::Management => {
                "UPDATE teaching_contracts SET status = $2, management_signature_path = $3, \
                 management_signed_at = $4, updated_at = $4 WHERE id = $1"
            }
        };
        sqlx::query(sql)
            .bind(id)
            .bind(next.as_str())
            .bind(&signature.path)
            .bind(signature.signed_at)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let contract = self.require(id).await?;
        Ok(SignatureOutcome {
            previous_status,
            contract,
            replaced,
        })
    }

    async fn set_status(
        &self,
        id: Id,
        status: ContractStatus,
        now: DateTime<Utc>,
    ) -> RepositoryResult<TeachingContract> {
        let result = sqlx::query("UPDATE teaching_contracts SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(now)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(TeachingContract::TYPE_NAME, id));
        }
        self.require(id).await
    }

    async fn set_rendered_document(&self, id: Id, document: RenderedDocument) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE teaching_contracts SET pdf_path = $2, pdf_generated_at = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(&document.path)
        .bind(document.generated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(TeachingContract::TYPE_NAME, id));
        }
        Ok(())
    }

    async fn delete_draft(&self, id: Id) -> RepositoryResult<TeachingContract> {
        let mut tx = self.pool.begin().await?;
        let row = Self::lock_row(&mut tx, id).await?;
        let status = row.status()?;
        if !status.is_draft() {
            return Err(StateError::NotDraft {
                contract_id: id,
                status: status.to_string(),
            }
            .into());
        }

        let items = sqlx::query_as::<_, LineItemRow>(&format!(
            "SELECT {} FROM teaching_contract_courses WHERE contract_id = $1 ORDER BY id",
            LINE_ITEM_COLUMNS
        ))
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM teaching_contracts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        row.into_contract(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("dara"), "%dara%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn test_lecturer_scope_sql() {
        let filters = ContractFilters {
            academic_year: Some("2025-2026".to_string()),
            ..Default::default()
        };
        let qb = list_query(ContractScope::Lecturer(42), &filters, today(), PageRequest::default());
        let sql = qb.sql();
        assert!(sql.contains("tc.lecturer_id = $1"));
        assert!(sql.contains("tc.academic_year = $2"));
        assert!(sql.contains("ORDER BY tc.created_at DESC"));
        assert!(sql.contains("LIMIT $3 OFFSET $4"));
    }

    #[test]
    fn test_department_scope_joins_courses() {
        let qb = count_query(ContractScope::Department(3), &ContractFilters::default(), today());
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT COUNT(*)"));
        assert!(sql.contains("c.department_id = $1"));
    }

    #[test]
    fn test_display_status_filter_sql() {
        let waiting = ContractFilters {
            status: Some(StatusFilter::Display(DisplayStatus::WaitingManagement)),
            ..Default::default()
        };
        let qb = count_query(ContractScope::All, &waiting, today());
        assert!(qb.sql().contains("tc.status = ANY($1)"));
        assert!(qb.sql().contains("tc.end_date >= $2"));

        let ended = ContractFilters {
            status: Some(StatusFilter::Display(DisplayStatus::ContractEnded)),
            ..Default::default()
        };
        let qb = count_query(ContractScope::All, &ended, today());
        assert!(qb.sql().contains("tc.end_date < $1"));
        assert!(!qb.sql().contains("tc.status"));
    }

    #[test]
    fn test_search_matches_name_or_email() {
        let filters = ContractFilters {
            search: Some("sok".to_string()),
            ..Default::default()
        };
        let qb = count_query(ContractScope::All, &filters, today());
        assert!(qb.sql().contains("u.display_name ILIKE $1 OR u.email ILIKE $2"));
    }

    #[test]
    fn test_row_with_unknown_status_is_rejected() {
        let now = Utc::now();
        let row = ContractRow {
            id: 1,
            lecturer_id: 10,
            created_by: 2,
            academic_year: "2025-2026".to_string(),
            term: "Term 1".to_string(),
            year_level: None,
            start_date: None,
            end_date: None,
            status: "SIGNED".to_string(),
            lecturer_signature_path: Some("contracts/1/signatures/lecturer/a.png".to_string()),
            lecturer_signed_at: Some(now),
            management_signature_path: None,
            management_signed_at: None,
            pdf_path: None,
            pdf_generated_at: None,
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(row.clone().into_contract(vec![]), Err(RepositoryError::Decode(_))));

        let mut valid = row;
        valid.status = "LECTURER_SIGNED".to_string();
        let contract = valid.into_contract(vec![]).unwrap();
        assert!(contract.lecturer_signature.is_some());
        assert!(contract.management_signature.is_none());
    }

    /// Run against a scratch database: `DATABASE_URL=postgres://... cargo test -- --ignored`
    mod postgres {
        use super::*;
        use staffing_models::NewLineItem;

        async fn seed(pool: &PgPool) {
            sqlx::query(
                "INSERT INTO users (id, display_name, email, role, department_id) \
                 VALUES (10, 'Sok Dara', 'dara@example.edu', 'lecturer', 3)",
            )
            .execute(pool)
            .await
            .unwrap();
            sqlx::query("INSERT INTO courses (id, name, department_id) VALUES (1, 'Databases', 3), (2, 'Networks', 4)")
                .execute(pool)
                .await
                .unwrap();
        }

        fn new_contract(courses: &[Id]) -> NewTeachingContract {
            NewTeachingContract {
                lecturer_id: 10,
                created_by: 1,
                academic_year: "2025-2026".to_string(),
                term: "Term 1".to_string(),
                year_level: None,
                start_date: None,
                end_date: None,
                line_items: courses
                    .iter()
                    .map(|course_id| NewLineItem {
                        course_id: *course_id,
                        class_id: None,
                        course_name: format!("Course {}", course_id),
                        hours: 20,
                    })
                    .collect(),
            }
        }

        fn signature(role: &str) -> SignatureArtifact {
            SignatureArtifact {
                path: format!("contracts/1/signatures/{}/abc.png", role),
                signed_at: Utc::now(),
            }
        }

        async fn row_count(pool: &PgPool, table: &str) -> i64 {
            sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
                .fetch_one(pool)
                .await
                .unwrap()
        }

        #[sqlx::test]
        #[ignore = "needs DATABASE_URL"]
        async fn test_create_with_unknown_course_writes_nothing(pool: PgPool) {
            seed(&pool).await;
            let store = PgContractStore::new(pool.clone());

            let err = store.create(new_contract(&[1, 999]), Utc::now()).await.unwrap_err();
            assert!(matches!(err, RepositoryError::NotFound { entity: "Course", .. }));
            assert_eq!(row_count(&pool, "teaching_contracts").await, 0);
            assert_eq!(row_count(&pool, "teaching_contract_courses").await, 0);

            let created = store.create(new_contract(&[1, 2]), Utc::now()).await.unwrap();
            assert_eq!(created.status, ContractStatus::Draft);
            assert_eq!(created.line_items.len(), 2);
            assert_eq!(store.departments_of(created.id).await.unwrap(), vec![3, 4]);
        }

        #[sqlx::test]
        #[ignore = "needs DATABASE_URL"]
        async fn test_signatures_under_row_lock(pool: PgPool) {
            seed(&pool).await;
            let store = PgContractStore::new(pool);
            let id = store.create(new_contract(&[1]), Utc::now()).await.unwrap().id;

            let first = store.apply_signature(id, SignerRole::Lecturer, signature("lecturer")).await.unwrap();
            assert_eq!(first.previous_status, ContractStatus::Draft);
            assert_eq!(first.contract.status, ContractStatus::LecturerSigned);
            assert!(first.replaced.is_none());

            let again = store.apply_signature(id, SignerRole::Lecturer, signature("lecturer")).await.unwrap();
            assert_eq!(again.contract.status, ContractStatus::LecturerSigned);
            assert!(again.replaced.is_some());

            let done = store
                .apply_signature(id, SignerRole::Management, signature("management"))
                .await
                .unwrap();
            assert_eq!(done.contract.status, ContractStatus::Completed);

            let err = store
                .apply_signature(id, SignerRole::Management, signature("management"))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                RepositoryError::InvalidState(StateError::AlreadyCompleted { contract_id }) if contract_id == id
            ));
            let stored = store.find(id).await.unwrap().unwrap();
            assert_eq!(stored.management_signature, done.contract.management_signature);
        }

        #[sqlx::test]
        #[ignore = "needs DATABASE_URL"]
        async fn test_delete_only_drafts(pool: PgPool) {
            seed(&pool).await;
            let store = PgContractStore::new(pool.clone());
            let signed = store.create(new_contract(&[1]), Utc::now()).await.unwrap().id;
            store.apply_signature(signed, SignerRole::Lecturer, signature("lecturer")).await.unwrap();

            let err = store.delete_draft(signed).await.unwrap_err();
            assert!(matches!(err, RepositoryError::InvalidState(StateError::NotDraft { .. })));
            assert!(store.find(signed).await.unwrap().is_some());
            assert_eq!(row_count(&pool, "teaching_contract_courses").await, 1);

            let draft = store.create(new_contract(&[2]), Utc::now()).await.unwrap().id;
            let deleted = store.delete_draft(draft).await.unwrap();
            assert_eq!(deleted.line_items.len(), 1);
            assert!(store.find(draft).await.unwrap().is_none());
            assert_eq!(row_count(&pool, "teaching_contract_courses").await, 1);
        }

        #[sqlx::test]
        #[ignore = "needs DATABASE_URL"]
        async fn test_scoped_page_and_count(pool: PgPool) {
            seed(&pool).await;
            let store = PgContractStore::new(pool);
            for courses in [&[1][..], &[2], &[1, 2]] {
                store.create(new_contract(courses), Utc::now()).await.unwrap();
            }

            let filters = ContractFilters::default();
            let department = store
                .list(ContractScope::Department(4), &filters, today(), PageRequest::new(1, 1))
                .await
                .unwrap();
            assert_eq!(department.total, 2);
            assert_eq!(department.items.len(), 1);

            let own = store
                .list(ContractScope::Lecturer(10), &filters, today(), PageRequest::default())
                .await
                .unwrap();
            assert_eq!(own.total, 3);

            let other = store
                .list(ContractScope::Lecturer(11), &filters, today(), PageRequest::default())
                .await
                .unwrap();
            assert_eq!(other.total, 0);
            assert!(other.items.is_empty());
        }
    }
}
