//! # staffing-validation
//!
//! Validation run before every contract write.
//!
//! Each operation has its own validation type that turns raw request input
//! into a typed value or a set of field-level [`ValidationErrors`]. Nothing
//! here touches storage or checks permissions.
//!
//! [`ValidationErrors`]: staffing_core::error::ValidationErrors

pub mod base;
pub mod teaching_contracts;

pub use base::*;
pub use teaching_contracts::{
    ContractDraft, CreateContractValidation, DeleteContractValidation, LineItemDraft,
    ListFilterDraft, ListFilterValidation, SignatureValidation, StatusOverrideDraft,
    StatusOverrideValidation,
};
