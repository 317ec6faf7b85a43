//! Status-coded errors returned to remote callers

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const INTERFACE_NOT_FOUND: &str = "Interface does not exist on this device!";

/// Failure class reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    NotFound,
    FailedPrecondition,
    Internal,
    InvalidArgument,
}

impl ErrorCode {
    pub fn http_status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::FailedPrecondition => StatusCode::PRECONDITION_FAILED,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(ErrorCode::NotFound, INTERFACE_NOT_FOUND)
    }

    /// Batch rejected before any mutation.
    pub fn failed_precondition(detail: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::FailedPrecondition,
            format!("Wrong input for this method, {}", detail),
        )
    }

    /// Batch failed while being applied; prior state has been restored.
    pub fn apply_failed(detail: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::Internal,
            format!("Errors occured while applying new settings, {}", detail),
        )
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::new(ErrorCode::Internal, detail.to_string())
    }

    pub fn invalid_argument(detail: impl std::fmt::Display) -> Self {
        Self::new(ErrorCode::InvalidArgument, detail.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.code.http_status(), Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_match_wire_contract() {
        assert_eq!(
            ServiceError::failed_precondition("wrong ip address 1.2.3").message,
            "Wrong input for this method, wrong ip address 1.2.3"
        );
        assert_eq!(
            ServiceError::apply_failed("Delete failed: busy").message,
            "Errors occured while applying new settings, Delete failed: busy"
        );
        assert_eq!(ServiceError::not_found().code.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn body_carries_code_and_message() {
        let body = serde_json::to_value(ServiceError::not_found()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"code": "NotFound", "message": INTERFACE_NOT_FOUND})
        );
    }
}
