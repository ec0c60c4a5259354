//! # staffing-services
//!
//! Business operations on teaching contracts.
//!
//! Each operation validates its input, checks the caller against the access
//! gate, and then drives the store, blob storage and PDF engine. Services
//! return [`StaffingResult`] and never touch HTTP types.
//!
//! [`StaffingResult`]: staffing_core::result::StaffingResult

pub mod rates;
pub mod teaching_contracts;

pub use rates::RateResolver;
pub use teaching_contracts::{
    ContractService, ContractServiceConfig, ContractView, RenderedPdf, SignatureUpload,
};
