//! Listing filter validation

use serde::Deserialize;
use staffing_core::error::ValidationErrors;
use staffing_core::traits::Id;
use staffing_models::{ContractFilters, StatusFilter};

use crate::base::present;

/// Query-string filters as sent by the client
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFilterDraft {
    #[serde(default, alias = "academicYear")]
    pub academic_year: Option<String>,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    /// Accepted for compatibility, never applied
    #[serde(default, alias = "lecturerId")]
    pub lecturer_id: Option<Id>,
    /// Accepted for compatibility, never applied
    #[serde(default, alias = "departmentId")]
    pub department_id: Option<Id>,
}

pub struct ListFilterValidation;

impl ListFilterValidation {
    /// Client lecturer and department filters are dropped here; visibility
    /// comes from the caller's scope only.
    pub fn validate(draft: &ListFilterDraft) -> Result<ContractFilters, ValidationErrors> {
        let status = match present(draft.status.as_deref()) {
            None => None,
            Some(raw) => Some(StatusFilter::parse(raw).map_err(|_| {
                ValidationErrors::single("status", "is not a known contract or display status")
            })?),
        };

        Ok(ContractFilters {
            academic_year: present(draft.academic_year.as_deref()).map(str::to_string),
            term: present(draft.term.as_deref()).map(str::to_string),
            status,
            search: present(draft.q.as_deref()).map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staffing_models::DisplayStatus;

    #[test]
    fn test_blank_filters_are_dropped() {
        let draft = ListFilterDraft {
            academic_year: Some(" ".to_string()),
            term: Some("Term 1".to_string()),
            q: Some("".to_string()),
            ..Default::default()
        };
        let filters = ListFilterValidation::validate(&draft).unwrap();
        assert_eq!(filters.academic_year, None);
        assert_eq!(filters.term.as_deref(), Some("Term 1"));
        assert_eq!(filters.search, None);
    }

    #[test]
    fn test_status_filter_parsed() {
        let draft = ListFilterDraft {
            status: Some("contract_ended".to_string()),
            lecturer_id: Some(99),
            ..Default::default()
        };
        let filters = ListFilterValidation::validate(&draft).unwrap();
        assert_eq!(filters.status, Some(StatusFilter::Display(DisplayStatus::ContractEnded)));

        let bad = ListFilterDraft {
            status: Some("archived".to_string()),
            ..Default::default()
        };
        assert!(ListFilterValidation::validate(&bad).unwrap_err().has_error("status"));
    }
}
