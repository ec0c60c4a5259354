//! Read-only lookups into tables owned by other subsystems
//!
//! Tables: users, candidates

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use staffing_core::traits::Id;
use staffing_models::{CandidateRecord, LecturerSummary};

use crate::repository::{CandidateDirectory, LecturerDirectory, RepositoryResult};

#[derive(Debug, Clone, FromRow)]
struct LecturerRow {
    id: i64,
    display_name: String,
    email: String,
    department_id: Option<i64>,
}

impl From<LecturerRow> for LecturerSummary {
    fn from(row: LecturerRow) -> Self {
        LecturerSummary {
            id: row.id,
            display_name: row.display_name,
            email: row.email,
            department_id: row.department_id,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct CandidateRow {
    id: i64,
    full_name: String,
    email: Option<String>,
    hourly_rate: Option<String>,
}

impl From<CandidateRow> for CandidateRecord {
    fn from(row: CandidateRow) -> Self {
        CandidateRecord {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            hourly_rate: row.hourly_rate,
        }
    }
}

/// Postgres-backed lecturer and candidate directory
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LecturerDirectory for PgDirectory {
    async fn find_lecturer(&self, id: Id) -> RepositoryResult<Option<LecturerSummary>> {
        let row = sqlx::query_as::<_, LecturerRow>(
            "SELECT id, display_name, email, department_id FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn find_lecturers(&self, ids: &[Id]) -> RepositoryResult<Vec<LecturerSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, LecturerRow>(
            "SELECT id, display_name, email, department_id FROM users WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl CandidateDirectory for PgDirectory {
    async fn find_by_normalized_name(
        &self,
        normalized_name: &str,
    ) -> RepositoryResult<Option<CandidateRecord>> {
        let row = sqlx::query_as::<_, CandidateRow>(
            r#"
            SELECT id, full_name, email, hourly_rate
            FROM candidates
            WHERE lower(regexp_replace(btrim(full_name), '\s+', ' ', 'g')) = lower($1)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(normalized_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<CandidateRecord>> {
        let row = sqlx::query_as::<_, CandidateRow>(
            "SELECT id, full_name, email, hourly_rate FROM candidates WHERE email = $1 ORDER BY id LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}
