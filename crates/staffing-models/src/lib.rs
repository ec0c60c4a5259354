//! # staffing-models
//!
//! Domain models for the teaching-contract engine.
//!
//! Contracts and their line items map onto `teaching_contracts` and
//! `teaching_contract_courses`. Lecturers and hiring candidates are owned by
//! other subsystems and only appear here as read-only summaries.

pub use staffing_core::traits::{Entity, Id};

pub mod caller;
pub mod candidate;
pub mod contract;
pub mod filter;
pub mod lecturer;
pub mod status;

pub use caller::{Caller, CallerRole, ContractScope};
pub use candidate::CandidateRecord;
pub use contract::{
    ContractLineItem, ContractPeriod, NewLineItem, NewTeachingContract, RenderedDocument,
    SignatureArtifact, TeachingContract,
};
pub use filter::{ContractFilters, StatusFilter};
pub use lecturer::LecturerSummary;
pub use status::{ContractStatus, DisplayStatus, ParseStatusError, SignerRole};
