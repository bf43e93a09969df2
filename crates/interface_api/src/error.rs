//! API error handling
//!
//! Every failure leaves the API as `{"error": "<message>"}` with a status
//! code chosen by the error kind.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_invoicing::InvoicingError;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    /// Details are logged, never sent to the client
    #[error("Internal server error")]
    Internal(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unavailable(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(detail) = &self {
            error!(error = %detail, "Request failed");
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<InvoicingError> for ApiError {
    fn from(err: InvoicingError) -> Self {
        match err {
            InvoicingError::DateParse { .. } => ApiError::BadRequest(err.to_string()),
            InvoicingError::Validation(_) => ApiError::Validation(err.to_string()),
            InvoicingError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            InvoicingError::Conflict(message) => ApiError::Conflict(message),
            InvoicingError::Unauthorized(message) => ApiError::Unauthorized(message),
            InvoicingError::Persistence(message) => ApiError::Internal(message),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenCreation(message) | AuthError::PasswordHash(message) => {
                ApiError::Internal(message)
            }
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(format!("Validation error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::CoreError;

    #[test]
    fn test_domain_errors_map_to_status_codes() {
        let date_err = domain_invoicing::parse_due_date("13/45/2024").unwrap_err();
        assert_eq!(ApiError::from(date_err).status(), StatusCode::BAD_REQUEST);

        let cases = [
            (InvoicingError::persistence("db down"), StatusCode::INTERNAL_SERVER_ERROR),
            (InvoicingError::not_found("Invoice", "x"), StatusCode::NOT_FOUND),
            (InvoicingError::Conflict("taken".into()), StatusCode::CONFLICT),
            (InvoicingError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (CoreError::validation("bad").into(), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_internal_details_hidden() {
        let err = ApiError::from(InvoicingError::persistence("connection refused"));
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn test_conflict_message_passed_through() {
        let err = ApiError::from(InvoicingError::Conflict("Email is already in use.".into()));
        assert_eq!(err.to_string(), "Email is already in use.");
    }
}
