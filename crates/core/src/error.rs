//! Domain error model.
//!
//! Every failure a client can observe is a [`DomainError`]: a closed [`ErrorKind`]
//! plus a message, the HTTP status fixed at construction, and the moment it was
//! raised. The API layer renders it as an [`ErrorResponse`] and nothing else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Closed set of client-visible failure kinds.
///
/// [`ErrorKind::code`] (e.g. `ACCESS_DENIED`) is the stable name clients branch
/// on, and also the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    AuthenticationRequired,
    TokenExpired,
    TokenInvalid,
    AccessDenied,
    DuplicateResource,
    ResourceNotFound,
    MethodNotAllowed,
    InvalidRequest,
    InternalError,
}

impl ErrorKind {
    /// Fixed message template for this kind.
    pub fn message(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "Authentication is required to access this resource",
            Self::TokenExpired => "Authentication token has expired",
            Self::TokenInvalid => "Authentication token is invalid",
            Self::AccessDenied => {
                "Access denied to the requested resource, you do not have the correct role"
            }
            Self::DuplicateResource => "A product with the same barcode already exists",
            Self::ResourceNotFound => "The requested resource does not exist",
            Self::MethodNotAllowed => "The request method is not supported for this resource",
            Self::InvalidRequest => "The request is malformed",
            Self::InternalError => "An internal error occurred",
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenInvalid => "TOKEN_INVALID",
            Self::AccessDenied => "ACCESS_DENIED",
            Self::DuplicateResource => "DUPLICATE_RESOURCE",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status associated with this kind.
    pub fn status(&self) -> u16 {
        match self {
            Self::AuthenticationRequired | Self::TokenExpired | Self::TokenInvalid => 401,
            Self::AccessDenied => 403,
            Self::DuplicateResource => 409,
            Self::ResourceNotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::InvalidRequest => 400,
            Self::InternalError => 500,
        }
    }
}

impl Serialize for ErrorKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// Domain-level error.
///
/// Immutable once built: status and timestamp are captured by the constructor.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}: {}", .kind.code(), .message)]
pub struct DomainError {
    kind: ErrorKind,
    message: String,
    status: u16,
    timestamp: DateTime<Utc>,
}

impl DomainError {
    /// Error carrying the kind's fixed message.
    pub fn new(kind: ErrorKind) -> Self {
        Self::with_message(kind, kind.message())
    }

    /// Error whose message is the kind's template followed by `: {detail}`.
    pub fn with_detail(kind: ErrorKind, detail: impl AsRef<str>) -> Self {
        let detail = detail.as_ref();
        if detail.is_empty() {
            return Self::new(kind);
        }
        Self::with_message(kind, format!("{}: {}", kind.message(), detail))
    }

    fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: kind.status(),
            timestamp: Utc::now(),
        }
    }

    pub fn authentication_required() -> Self {
        Self::new(ErrorKind::AuthenticationRequired)
    }

    pub fn access_denied(detail: impl AsRef<str>) -> Self {
        Self::with_detail(ErrorKind::AccessDenied, detail)
    }

    /// A product with `barcode` already exists.
    pub fn duplicate_resource(barcode: &str) -> Self {
        Self::with_message(
            ErrorKind::DuplicateResource,
            format!("Product with barcode {barcode} already exists"),
        )
    }

    pub fn not_found(detail: impl AsRef<str>) -> Self {
        Self::with_detail(ErrorKind::ResourceNotFound, detail)
    }

    /// The route exists but does not accept `method`.
    pub fn method_not_allowed(method: &str, path: &str) -> Self {
        Self::with_detail(ErrorKind::MethodNotAllowed, format!("{method} {path}"))
    }

    pub fn invalid_request(detail: impl AsRef<str>) -> Self {
        Self::with_detail(ErrorKind::InvalidRequest, detail)
    }

    pub fn internal(detail: impl AsRef<str>) -> Self {
        Self::with_detail(ErrorKind::InternalError, detail)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Wire representation of this error.
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            message: self.message.clone(),
            code: self.code().to_string(),
            timestamp: self.timestamp,
        }
    }
}

/// The only body shape returned on failure paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

impl From<DomainError> for ErrorResponse {
    fn from(err: DomainError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.message,
            timestamp: err.timestamp,
        }
    }
}
