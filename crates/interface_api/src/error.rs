//! API error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domain_pledge::PledgeError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String, Vec<String>),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None),
            ApiError::Validation(msg, details) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                msg,
                (!details.is_empty()).then_some(details),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<PledgeError> for ApiError {
    fn from(err: PledgeError) -> Self {
        if err.is_user_error() {
            return ApiError::Validation(err.to_string(), Vec::new());
        }

        match &err {
            PledgeError::PledgeNotFound(_) => ApiError::NotFound(err.to_string()),
            PledgeError::ConcurrentModification(_) => ApiError::Conflict(err.to_string()),
            _ => {
                error!(error = %err, "Pledge operation failed");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();

        ApiError::Validation("Request failed validation".to_string(), details)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::Validation(e.body_text(), Vec::new()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{Currency, Money, PledgeId, PortError};
    use rust_decimal::Decimal;

    fn status_of(err: PledgeError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_pledge_error_status_mapping() {
        let id = PledgeId::new();
        let money = Money::new(Decimal::ONE, Currency::GHS);

        assert_eq!(status_of(PledgeError::NonPositiveAmount(money)), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            status_of(PledgeError::ExceedsRemainingBalance { proposed: money, remaining: money }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(PledgeError::CurrencyMismatch("USD".into(), "GHS".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(PledgeError::UnknownCurrency("XYZ".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(status_of(PledgeError::PledgeNotFound(id)), StatusCode::NOT_FOUND);
        assert_eq!(status_of(PledgeError::ConcurrentModification(id)), StatusCode::CONFLICT);
        assert_eq!(
            status_of(PledgeError::InvariantViolation("negative".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(PledgeError::OverpaymentRejected { pledge_id: id, proposed: money, remaining: money }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(PledgeError::Store(PortError::internal("disk full"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
