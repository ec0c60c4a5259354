//! Validation for teaching-contract operations

mod create;
mod delete;
mod list;
mod signature;
mod status;

pub use create::{ContractDraft, CreateContractValidation, LineItemDraft};
pub use delete::DeleteContractValidation;
pub use list::{ListFilterDraft, ListFilterValidation};
pub use signature::SignatureValidation;
pub use status::{StatusOverrideDraft, StatusOverrideValidation};
