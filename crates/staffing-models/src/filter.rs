//! Listing filters
//!
//! Caller-supplied lecturer or department filters never reach this type; the
//! visibility scope comes from [`crate::Caller::scope`] alone.

use chrono::NaiveDate;

use crate::status::{ContractStatus, DisplayStatus, ParseStatusError};

/// Status filter accepted by the listing
///
/// `COMPLETED` names both a persisted and a display status; it is read as the
/// display status so the filter agrees with the badge shown in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Persisted(ContractStatus),
    Display(DisplayStatus),
}

impl StatusFilter {
    pub fn parse(raw: &str) -> Result<Self, ParseStatusError> {
        raw.parse::<DisplayStatus>()
            .map(StatusFilter::Display)
            .or_else(|_| raw.parse::<ContractStatus>().map(StatusFilter::Persisted))
    }

    pub fn matches(&self, status: ContractStatus, end_date: Option<NaiveDate>, today: NaiveDate) -> bool {
        match self {
            StatusFilter::Persisted(wanted) => status == *wanted,
            StatusFilter::Display(wanted) => DisplayStatus::project(status, end_date, today) == *wanted,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractFilters {
    pub academic_year: Option<String>,
    pub term: Option<String>,
    pub status: Option<StatusFilter>,
    /// Free text matched against lecturer name and email
    pub search: Option<String>,
}
