//! Teaching contract model
//!
//! Table: teaching_contracts (header) + teaching_contract_courses (line items)

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use staffing_core::traits::{Entity, Id};

use crate::status::{ContractStatus, DisplayStatus, SignerRole};

/// A stored blob reference stamped with the moment it was written
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureArtifact {
    /// Storage key of the uploaded image
    pub path: String,
    pub signed_at: DateTime<Utc>,
}

/// Last rendered PDF for a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedDocument {
    pub path: String,
    pub generated_at: DateTime<Utc>,
}

/// One course assignment inside a contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractLineItem {
    pub id: Id,
    pub contract_id: Id,
    pub course_id: Id,
    pub class_id: Option<Id>,
    /// Denormalized at creation time
    pub course_name: String,
    pub year_level: Option<String>,
    pub term: String,
    pub academic_year: String,
    pub hours: i32,
}

/// Contract header with its line items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeachingContract {
    pub id: Id,
    pub lecturer_id: Id,
    pub created_by: Id,
    pub academic_year: String,
    pub term: String,
    pub year_level: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: ContractStatus,
    pub lecturer_signature: Option<SignatureArtifact>,
    pub management_signature: Option<SignatureArtifact>,
    pub rendered_document: Option<RenderedDocument>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub line_items: Vec<ContractLineItem>,
}

/// How the contract period is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractPeriod {
    Dated {
        start: NaiveDate,
        end: Option<NaiveDate>,
    },
    /// End date only; the start follows the term
    Until { end: NaiveDate },
    TermBased,
}

impl TeachingContract {
    pub fn total_hours(&self) -> i64 {
        self.line_items.iter().map(|item| i64::from(item.hours)).sum()
    }

    pub fn display_status(&self, today: NaiveDate) -> DisplayStatus {
        DisplayStatus::project(self.status, self.end_date, today)
    }

    pub fn signature(&self, role: SignerRole) -> Option<&SignatureArtifact> {
        match role {
            SignerRole::Lecturer => self.lecturer_signature.as_ref(),
            SignerRole::Management => self.management_signature.as_ref(),
        }
    }

    /// Without any date the contract is presented by term
    pub fn period(&self) -> ContractPeriod {
        match (self.start_date, self.end_date) {
            (Some(start), end) => ContractPeriod::Dated { start, end },
            (None, Some(end)) => ContractPeriod::Until { end },
            (None, None) => ContractPeriod::TermBased,
        }
    }

    /// Course names joined for the document subject line
    pub fn subject_names(&self) -> String {
        let mut names: Vec<&str> = Vec::with_capacity(self.line_items.len());
        for item in &self.line_items {
            if !names.contains(&item.course_name.as_str()) {
                names.push(&item.course_name);
            }
        }
        names.join(", ")
    }

    /// Course ids referenced by the line items
    pub fn course_ids(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self.line_items.iter().map(|item| item.course_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

impl Entity for TeachingContract {
    const TYPE_NAME: &'static str = "TeachingContract";

    fn id(&self) -> Id {
        self.id
    }
}

/// Validated input for a new contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeachingContract {
    pub lecturer_id: Id,
    pub created_by: Id,
    pub academic_year: String,
    pub term: String,
    pub year_level: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub line_items: Vec<NewLineItem>,
}

/// Validated input for one course assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub course_id: Id,
    pub class_id: Option<Id>,
    pub course_name: String,
    pub hours: i32,
}
