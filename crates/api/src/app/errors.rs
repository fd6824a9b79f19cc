//! Failure-to-response translation.
//!
//! Every rejected request, whether it failed authentication, authorization, body
//! parsing, or a business rule, leaves through [`ApiError`] and is rendered as
//! an `ErrorResponse` with the status fixed by its `DomainError`.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use stockroom_auth::{AccessError, AuthenticationFailure};
use stockroom_core::DomainError;

/// Error type returned by handlers and the security middleware.
#[derive(Debug)]
pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl From<AuthenticationFailure> for ApiError {
    fn from(failure: AuthenticationFailure) -> Self {
        Self(failure.into())
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        Self(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DomainError::invalid_request(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let status = StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(code = err.code(), message = err.message(), "request failed");
        } else {
            tracing::debug!(code = err.code(), status = status.as_u16(), "request rejected");
        }

        (status, Json(err.to_response())).into_response()
    }
}
