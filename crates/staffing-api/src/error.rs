//! API error handling
//!
//! Every failure leaves the API as `{"error": code, "message": text}` with an
//! optional `details` object carrying field-level validation messages.

use axum::{
    extract::multipart::MultipartError,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use staffing_core::error::{StaffingError, ValidationErrors};
use tracing::error;

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Anything raised below the HTTP layer
    Staffing(StaffingError),
    /// The request could not be decoded into handler input
    Rejected { status: StatusCode, message: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Staffing(err) => {
                StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ApiError::Rejected { status, .. } => *status,
        }
    }
}

impl From<StaffingError> for ApiError {
    fn from(err: StaffingError) -> Self {
        ApiError::Staffing(err)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Staffing(errors.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Rejected {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<ValidationErrors>,
}

fn rejection_code(status: StatusCode) -> &'static str {
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "unsupported_media_type",
        StatusCode::NOT_FOUND => "not_found",
        _ => "bad_request",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Staffing(err) if err.is_internal() => {
                error!(error = %err, code = err.error_code(), "Request failed");
                ErrorBody {
                    error: err.error_code(),
                    message: if err.is_retryable() {
                        "The request could not be completed, please retry".to_string()
                    } else {
                        "Internal server error".to_string()
                    },
                    details: None,
                }
            }
            ApiError::Staffing(StaffingError::Validation(errors)) => ErrorBody {
                error: "validation_failed",
                message: errors.full_messages().join(", "),
                details: Some(errors),
            },
            ApiError::Staffing(err) => ErrorBody {
                error: err.error_code(),
                message: err.to_string(),
                details: None,
            },
            ApiError::Rejected { status, message } => ErrorBody {
                error: rejection_code(status),
                message,
                details: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
