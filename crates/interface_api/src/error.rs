//! API error handling
//!
//! Domain failures keep their [`ErrorKind`] all the way to the response,
//! which picks the status code and the `error` field of the body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use core_kernel::ErrorKind;
use domain_access::AccessError;
use domain_claims::ClaimError;
use domain_policy::PolicyError;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// A registry or guard rejected the operation
    #[error("{message}")]
    Domain { kind: ErrorKind, message: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// HTTP status for a domain error kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
        ErrorKind::InvalidArgument
        | ErrorKind::AmountMismatch
        | ErrorKind::ClaimExceedsCoverage
        | ErrorKind::InsufficientCoverage => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InvalidState | ErrorKind::PolicyNotActive | ErrorKind::PolicyExpired => {
            StatusCode::CONFLICT
        }
        ErrorKind::TransferFailed => StatusCode::BAD_GATEWAY,
        ErrorKind::Storage => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            ApiError::Domain { kind, message } => {
                let status = status_for(kind);
                if status.is_server_error() {
                    error!(kind = %kind, %message, "Request failed");
                } else {
                    warn!(kind = %kind, %message, "Request rejected");
                }
                // store internals stay in the log
                let message = if kind == ErrorKind::Storage {
                    "Internal storage error".to_string()
                } else {
                    message
                };
                (status, kind.as_str(), message)
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthenticated", msg),
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "invalid_argument", msg)
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        ApiError::Domain {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<PolicyError> for ApiError {
    fn from(err: PolicyError) -> Self {
        ApiError::Domain {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        ApiError::Domain {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthorized(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}
