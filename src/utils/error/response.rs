//! HTTP response handling for errors

use super::types::PortalError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

impl PortalError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            PortalError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            PortalError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            PortalError::Serialization(_) => (StatusCode::BAD_REQUEST, "PARSING_ERROR"),
            PortalError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            PortalError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            PortalError::Timeout(_) => (StatusCode::REQUEST_TIMEOUT, "TIMEOUT"),
            PortalError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            PortalError::Io(_) | PortalError::Yaml(_) | PortalError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl ResponseError for PortalError {
    fn status_code(&self) -> StatusCode {
        self.status_and_code().0
    }

    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code) = self.status_and_code();

        // IO and YAML details stay in the logs
        let message = match self {
            PortalError::Io(_) | PortalError::Yaml(_) => "An internal error occurred".to_string(),
            _ => self.to_string(),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: error_code.to_string(),
                message,
                timestamp: chrono::Utc::now().timestamp(),
            },
        };

        HttpResponse::build(status_code).json(error_response)
    }
}

/// Standard error response format
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail information
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub timestamp: i64,
}
