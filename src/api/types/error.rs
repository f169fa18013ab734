//! API error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::DomainError;

pub const BAD_CREDENTIALS: &str = "Bad credentials";
pub const MISSING_TOKEN: &str = "Missing or poorly formed authentication token.";
pub const TOKEN_EXPIRED: &str = "Token expired";
pub const TOKEN_INVALID: &str = "Invalid token";
/// Answer for every unusable action token, whatever the reason
pub const ACTION_TOKEN_UNUSABLE: &str = "Invalid or expired token";

/// Error body: `{"error": ..., "status": ...}` plus optional details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error with status code
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub response: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            response: ApiErrorResponse {
                error: message.into(),
                status: status.as_u16(),
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.response.details = Some(details);
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.response)).into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match &err {
            DomainError::NotFound { message } => Self::not_found(message),
            DomainError::InvalidToken { message } => {
                debug!(reason = %message, "Rejected action token");
                Self::bad_request(ACTION_TOKEN_UNUSABLE)
            }
            DomainError::TokenExpired => Self::unauthorized(TOKEN_EXPIRED),
            DomainError::TokenInvalid { .. } => Self::unauthorized(TOKEN_INVALID),
            DomainError::BadCredentials => Self::unauthorized(BAD_CREDENTIALS),
            DomainError::Forbidden { message } => Self::forbidden(message),
            DomainError::DuplicateEmail { .. } => Self::conflict(err.to_string()),
            DomainError::IllegalCustomerAccountDeletion { .. } => Self::conflict(err.to_string()),
            DomainError::Validation { message } => Self::bad_request(message),
            DomainError::NotificationFailed { .. } => {
                error!(error = %err, "Notification delivery failed");
                Self::internal("Failed to send notification email")
            }
            DomainError::Configuration { .. }
            | DomainError::Storage { .. }
            | DomainError::Internal { .. } => {
                error!(error = %err, "Request failed");
                Self::internal("Internal server error")
            }
        }
    }
}
