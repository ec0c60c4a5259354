//! Caller identity and the contract visibility it implies

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use staffing_core::traits::Id;

use crate::status::ParseStatusError;

/// Roles issued by the identity subsystem
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CallerRole {
    Superadmin,
    Admin,
    Management,
    Lecturer,
}

impl CallerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallerRole::Superadmin => "superadmin",
            CallerRole::Admin => "admin",
            CallerRole::Management => "management",
            CallerRole::Lecturer => "lecturer",
        }
    }
}

impl fmt::Display for CallerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallerRole {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "superadmin" | "super_admin" => Ok(CallerRole::Superadmin),
            "admin" => Ok(CallerRole::Admin),
            "management" => Ok(CallerRole::Management),
            "lecturer" => Ok(CallerRole::Lecturer),
            _ => Err(ParseStatusError::unknown("caller role", s)),
        }
    }
}

/// Which contracts a caller may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractScope {
    All,
    /// Contracts with at least one course in this department
    Department(Id),
    /// Contracts where the lecturer reference equals this id
    Lecturer(Id),
    /// Department-scoped role without a department
    Nothing,
}

/// Authenticated caller as seen by the contract engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: Id,
    pub role: CallerRole,
    pub department_id: Option<Id>,
}

impl Caller {
    pub fn new(id: Id, role: CallerRole, department_id: Option<Id>) -> Self {
        Self {
            id,
            role,
            department_id,
        }
    }

    pub fn scope(&self) -> ContractScope {
        match self.role {
            CallerRole::Superadmin => ContractScope::All,
            CallerRole::Lecturer => ContractScope::Lecturer(self.id),
            CallerRole::Admin | CallerRole::Management => match self.department_id {
                Some(department_id) => ContractScope::Department(department_id),
                None => ContractScope::Nothing,
            },
        }
    }

    pub fn is_lecturer(&self) -> bool {
        matches!(self.role, CallerRole::Lecturer)
    }

    /// Admin-level write access (create, status override)
    pub fn is_admin(&self) -> bool {
        matches!(self.role, CallerRole::Admin | CallerRole::Superadmin)
    }
}
