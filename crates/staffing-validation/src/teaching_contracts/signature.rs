//! Signature upload validation
//!
//! Covers the form fields only. Size ceilings and image sniffing produce
//! 413/415 and live with the upload handling in `staffing-documents`.

use staffing_core::error::ValidationErrors;
use staffing_models::SignerRole;

use crate::base::present;

pub struct SignatureValidation;

impl SignatureValidation {
    /// `who` is the multipart role field, `file_len` the size of the file part if one was sent
    pub fn validate(who: Option<&str>, file_len: Option<usize>) -> Result<SignerRole, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let role = match present(who) {
            None => {
                errors.add("who", "can't be blank");
                None
            }
            Some(raw) => match raw.parse::<SignerRole>() {
                Ok(role) => Some(role),
                Err(_) => {
                    errors.add("who", "must be one of: lecturer, management");
                    None
                }
            },
        };

        match file_len {
            None => errors.add("file", "can't be blank"),
            Some(0) => errors.add("file", "can't be empty"),
            Some(_) => {}
        }

        match role {
            Some(role) if errors.is_empty() => Ok(role),
            _ => Err(errors),
        }
    }
}
