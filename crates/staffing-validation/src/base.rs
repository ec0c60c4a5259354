//! Shared validation helpers

use chrono::NaiveDate;
use staffing_core::error::ValidationErrors;

/// Accepted wire format for contract dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maximum length of free-text header fields
pub const MAX_TEXT_LENGTH: usize = 255;

/// Message for text that could never be printed on a contract document
pub const CONTROL_CHARS_MESSAGE: &str = "must not contain control characters";

/// Trimmed value, or `None` when absent or blank
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Required trimmed text field
pub fn required_text(field: &str, value: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    match present(value) {
        None => {
            errors.add(field, "can't be blank");
            None
        }
        Some(v) if v.chars().count() > MAX_TEXT_LENGTH => {
            errors.add(
                field,
                format!("is too long (maximum is {} characters)", MAX_TEXT_LENGTH),
            );
            None
        }
        Some(v) if has_control_chars(v) => {
            errors.add(field, CONTROL_CHARS_MESSAGE);
            None
        }
        Some(v) => Some(v.to_string()),
    }
}

/// Optional trimmed text field; blank counts as absent
pub fn optional_text(field: &str, value: Option<&str>, errors: &mut ValidationErrors) -> Option<String> {
    present(value)?;
    required_text(field, value, errors)
}

/// Any control character, newline and tab included; header fields are single-line
pub fn has_control_chars(value: &str) -> bool {
    value.chars().any(|c| c.is_control())
}

/// Optional `YYYY-MM-DD` date; blank counts as absent
pub fn optional_date(field: &str, value: Option<&str>, errors: &mut ValidationErrors) -> Option<NaiveDate> {
    let raw = present(value)?;
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "is not a valid date (expected YYYY-MM-DD)");
            None
        }
    }
}

/// Copy `validator` derive output into our error map under `prefix`
pub fn merge_validator_errors(
    prefix: &str,
    source: &validator::ValidationErrors,
    errors: &mut ValidationErrors,
) {
    for (field, field_errors) in source.field_errors() {
        for error in field_errors {
            let message = error
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("is invalid ({})", error.code));
            errors.add(format!("{}.{}", prefix, field), message);
        }
    }
}
