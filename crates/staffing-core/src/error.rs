//! Core error types for the staffing back-office
//!
//! One taxonomy shared by every layer; the API crate maps it onto HTTP statuses.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::traits::Id;

/// Core error type for all contract-engine operations
#[derive(Error, Debug)]
pub enum StaffingError {
    #[error("Not found: {entity} with id={id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid state: {0}")]
    InvalidState(#[from] StateError),

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Unsupported media type: {content_type}")]
    UnsupportedMediaType { content_type: String },

    #[error("Template error while rendering contract {contract_id}: {message}")]
    RenderTemplate { contract_id: Id, message: String },

    #[error("Render engine error for contract {contract_id}: {message}")]
    RenderEngine { contract_id: Id, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Rejected state-machine moves
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("contract {contract_id} is already completed")]
    AlreadyCompleted { contract_id: Id },

    #[error("contract {contract_id} is {status}, only DRAFT contracts can be deleted")]
    NotDraft { contract_id: Id, status: String },
}

/// Field-level validation errors
#[derive(Error, Debug, Default, Clone, Serialize)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// field name -> messages
    pub errors: BTreeMap<String, Vec<String>>,
    /// errors not tied to a field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.errors.get(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Shorthand for a single-field failure
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }
}

impl StaffingError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StaffingError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        StaffingError::Forbidden {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            StaffingError::Validation(_) => 400,
            StaffingError::Unauthorized { .. } => 401,
            StaffingError::Forbidden { .. } => 403,
            StaffingError::NotFound { .. } => 404,
            StaffingError::InvalidState(_) => 409,
            StaffingError::PayloadTooLarge { .. } => 413,
            StaffingError::UnsupportedMediaType { .. } => 415,
            StaffingError::RenderTemplate { .. }
            | StaffingError::RenderEngine { .. }
            | StaffingError::Database(_)
            | StaffingError::Storage(_)
            | StaffingError::Internal(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StaffingError::NotFound { .. } => "not_found",
            StaffingError::Validation(_) => "validation_failed",
            StaffingError::InvalidState(_) => "invalid_state",
            StaffingError::Unauthorized { .. } => "unauthorized",
            StaffingError::Forbidden { .. } => "access_denied",
            StaffingError::PayloadTooLarge { .. } => "payload_too_large",
            StaffingError::UnsupportedMediaType { .. } => "unsupported_media_type",
            StaffingError::RenderTemplate { .. } => "render_template_error",
            StaffingError::RenderEngine { .. } => "render_engine_error",
            StaffingError::Database(_) => "database_error",
            StaffingError::Storage(_) => "storage_error",
            StaffingError::Internal(_) => "internal_error",
        }
    }

    /// Whether the caller may simply retry the same request
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StaffingError::RenderEngine { .. } | StaffingError::Database(_) | StaffingError::Storage(_)
        )
    }

    /// 500-class errors keep their detail out of response bodies
    pub fn is_internal(&self) -> bool {
        self.status_code() >= 500
    }
}
