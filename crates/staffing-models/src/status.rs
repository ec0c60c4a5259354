//! Contract status model
//!
//! `ContractStatus` is the only status ever written to storage. `DisplayStatus`
//! is recomputed from it, the end date and "today" on every read.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Persisted signature progress of a contract
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    #[default]
    Draft,
    LecturerSigned,
    ManagementSigned,
    Completed,
}

/// The party uploading a signature
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SignerRole {
    Lecturer,
    Management,
}

/// Derived status shown to users, never stored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisplayStatus {
    WaitingLecturer,
    WaitingManagement,
    Completed,
    ContractEnded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl ContractStatus {
    pub const ALL: [ContractStatus; 4] = [
        ContractStatus::Draft,
        ContractStatus::LecturerSigned,
        ContractStatus::ManagementSigned,
        ContractStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "DRAFT",
            ContractStatus::LecturerSigned => "LECTURER_SIGNED",
            ContractStatus::ManagementSigned => "MANAGEMENT_SIGNED",
            ContractStatus::Completed => "COMPLETED",
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, ContractStatus::Draft)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ContractStatus::Completed)
    }

    /// Status after `role` signs, or `None` when the contract is already completed.
    ///
    /// Re-signing as the party that already signed keeps the status (the
    /// image is replaced); either order of the two parties ends in `Completed`.
    pub fn after_signature(self, role: SignerRole) -> Option<ContractStatus> {
        use ContractStatus::*;
        use SignerRole::*;

        match (self, role) {
            (Completed, _) => None,
            (Draft, Lecturer) => Some(LecturerSigned),
            (Draft, Management) => Some(ManagementSigned),
            (LecturerSigned, Management) | (ManagementSigned, Lecturer) => Some(Completed),
            (LecturerSigned, Lecturer) => Some(LecturerSigned),
            (ManagementSigned, Management) => Some(ManagementSigned),
        }
    }

    /// Persisted statuses that project to `display` when the contract has not ended
    pub fn projecting_to(display: DisplayStatus) -> &'static [ContractStatus] {
        match display {
            DisplayStatus::WaitingLecturer => &[ContractStatus::Draft, ContractStatus::ManagementSigned],
            DisplayStatus::WaitingManagement => &[ContractStatus::LecturerSigned],
            DisplayStatus::Completed => &[ContractStatus::Completed],
            DisplayStatus::ContractEnded => &ContractStatus::ALL,
        }
    }
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContractStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError::unknown("contract status", s))
    }
}

impl SignerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignerRole::Lecturer => "lecturer",
            SignerRole::Management => "management",
        }
    }
}

impl fmt::Display for SignerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignerRole {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lecturer" => Ok(SignerRole::Lecturer),
            "management" => Ok(SignerRole::Management),
            _ => Err(ParseStatusError::unknown("signer role", s)),
        }
    }
}

impl DisplayStatus {
    pub const ALL: [DisplayStatus; 4] = [
        DisplayStatus::WaitingLecturer,
        DisplayStatus::WaitingManagement,
        DisplayStatus::Completed,
        DisplayStatus::ContractEnded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::WaitingLecturer => "WAITING_LECTURER",
            DisplayStatus::WaitingManagement => "WAITING_MANAGEMENT",
            DisplayStatus::Completed => "COMPLETED",
            DisplayStatus::ContractEnded => "CONTRACT_ENDED",
        }
    }

    /// Project a persisted status onto what users see.
    ///
    /// An end date strictly before `today` wins over any signature progress.
    pub fn project(status: ContractStatus, end_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        if matches!(end_date, Some(end) if end < today) {
            return DisplayStatus::ContractEnded;
        }

        match status {
            ContractStatus::Draft | ContractStatus::ManagementSigned => DisplayStatus::WaitingLecturer,
            ContractStatus::LecturerSigned => DisplayStatus::WaitingManagement,
            ContractStatus::Completed => DisplayStatus::Completed,
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DisplayStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseStatusError::unknown("display status", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_either_party_may_sign_first() {
        assert_eq!(
            ContractStatus::Draft.after_signature(SignerRole::Lecturer),
            Some(ContractStatus::LecturerSigned)
        );
        assert_eq!(
            ContractStatus::Draft.after_signature(SignerRole::Management),
            Some(ContractStatus::ManagementSigned)
        );
    }

    #[test]
    fn test_completion_is_commutative() {
        let lecturer_first = ContractStatus::Draft
            .after_signature(SignerRole::Lecturer)
            .and_then(|s| s.after_signature(SignerRole::Management));
        let management_first = ContractStatus::Draft
            .after_signature(SignerRole::Management)
            .and_then(|s| s.after_signature(SignerRole::Lecturer));

        assert_eq!(lecturer_first, Some(ContractStatus::Completed));
        assert_eq!(lecturer_first, management_first);
    }

    #[test]
    fn test_completed_is_terminal() {
        assert_eq!(ContractStatus::Completed.after_signature(SignerRole::Lecturer), None);
        assert_eq!(ContractStatus::Completed.after_signature(SignerRole::Management), None);
        assert!(ContractStatus::Completed.is_terminal());
    }

    #[test]
    fn test_resigning_same_role_keeps_status() {
        assert_eq!(
            ContractStatus::LecturerSigned.after_signature(SignerRole::Lecturer),
            Some(ContractStatus::LecturerSigned)
        );
        assert_eq!(
            ContractStatus::ManagementSigned.after_signature(SignerRole::Management),
            Some(ContractStatus::ManagementSigned)
        );
    }

    #[test]
    fn test_projection_maps_persisted_status() {
        let today = date(2025, 6, 1);
        assert_eq!(
            DisplayStatus::project(ContractStatus::Draft, None, today),
            DisplayStatus::WaitingLecturer
        );
        assert_eq!(
            DisplayStatus::project(ContractStatus::ManagementSigned, None, today),
            DisplayStatus::WaitingLecturer
        );
        assert_eq!(
            DisplayStatus::project(ContractStatus::LecturerSigned, None, today),
            DisplayStatus::WaitingManagement
        );
        assert_eq!(
            DisplayStatus::project(ContractStatus::Completed, None, today),
            DisplayStatus::Completed
        );
    }

    #[test]
    fn test_expiry_overrides_progress() {
        let today = date(2025, 6, 1);
        let yesterday = date(2025, 5, 31);
        assert_eq!(
            DisplayStatus::project(ContractStatus::LecturerSigned, Some(yesterday), today),
            DisplayStatus::ContractEnded
        );
        assert_eq!(
            DisplayStatus::project(ContractStatus::Completed, Some(yesterday), today),
            DisplayStatus::ContractEnded
        );
    }

    #[test]
    fn test_contract_ending_today_is_still_running() {
        let today = date(2025, 6, 1);
        assert_eq!(
            DisplayStatus::project(ContractStatus::LecturerSigned, Some(today), today),
            DisplayStatus::WaitingManagement
        );
    }

    #[test]
    fn test_projection_is_pure() {
        let today = date(2025, 6, 1);
        for status in ContractStatus::ALL {
            for end in [None, Some(date(2025, 1, 1)), Some(today), Some(date(2026, 1, 1))] {
                assert_eq!(
                    DisplayStatus::project(status, end, today),
                    DisplayStatus::project(status, end, today)
                );
            }
        }
    }

    #[test]
    fn test_projecting_to_agrees_with_project() {
        let today = date(2025, 6, 1);
        for display in [
            DisplayStatus::WaitingLecturer,
            DisplayStatus::WaitingManagement,
            DisplayStatus::Completed,
        ] {
            for status in ContractStatus::projecting_to(display) {
                assert_eq!(DisplayStatus::project(*status, None, today), display);
            }
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("draft".parse::<ContractStatus>().unwrap(), ContractStatus::Draft);
        assert_eq!(
            "LECTURER_SIGNED".parse::<ContractStatus>().unwrap(),
            ContractStatus::LecturerSigned
        );
        assert!("SIGNED".parse::<ContractStatus>().is_err());
        assert_eq!(
            "contract_ended".parse::<DisplayStatus>().unwrap(),
            DisplayStatus::ContractEnded
        );
        assert_eq!("Management".parse::<SignerRole>().unwrap(), SignerRole::Management);
        assert!("dean".parse::<SignerRole>().is_err());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_string(&ContractStatus::LecturerSigned).unwrap(),
            "\"LECTURER_SIGNED\""
        );
        assert_eq!(
            serde_json::to_string(&DisplayStatus::WaitingManagement).unwrap(),
            "\"WAITING_MANAGEMENT\""
        );
        assert_eq!(serde_json::to_string(&SignerRole::Lecturer).unwrap(), "\"lecturer\"");
    }
}
