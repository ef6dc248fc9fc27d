use axum::{response::{IntoResponse, Response}, http::StatusCode};
use serde::Serialize;
use serde_json::json;

use crate::repository::repository_error::RepositoryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HandlerErrorKind {
    NotFound,
    Validation,
    Internal,
    Unauthorized,
    Forbidden,
    Conflict,
    BadRequest,
    TooManyRequests,
}

impl HandlerErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerErrorKind::NotFound => StatusCode::NOT_FOUND,
            HandlerErrorKind::Validation | HandlerErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            HandlerErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            HandlerErrorKind::Forbidden => StatusCode::FORBIDDEN,
            HandlerErrorKind::Conflict => StatusCode::CONFLICT,
            HandlerErrorKind::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            HandlerErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for HandlerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HandlerErrorKind::NotFound => "NotFound",
            HandlerErrorKind::Validation => "Validation",
            HandlerErrorKind::Internal => "Internal",
            HandlerErrorKind::Unauthorized => "Unauthorized",
            HandlerErrorKind::Forbidden => "Forbidden",
            HandlerErrorKind::Conflict => "Conflict",
            HandlerErrorKind::BadRequest => "BadRequest",
            HandlerErrorKind::TooManyRequests => "TooManyRequests",
        };
        write!(f, "{}", s)
    }
}

/// Error returned by handlers and middleware.
///
/// Rendered as `{ "success": false, "error": <message>, "kind": <kind>, "details"?: ... }`.
#[derive(Debug)]
pub struct HandlerError {
    pub kind: HandlerErrorKind,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerError {
    pub fn new(kind: HandlerErrorKind, message: impl Into<String>) -> Self {
        HandlerError { kind, message: message.into(), details: None }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::BadRequest, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::NotFound, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(HandlerErrorKind::Internal, message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.message,
            "kind": self.kind,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.kind.status(), axum::Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for HandlerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(errors.field_errors()).unwrap_or(serde_json::Value::Null);
        HandlerError::new(HandlerErrorKind::Validation, format!("Validation error: {}", errors))
            .with_details(details)
    }
}

impl From<ServiceError> for HandlerError {
    fn from(err: ServiceError) -> Self {
        let kind = match &err {
            ServiceError::NotFound(_) => HandlerErrorKind::NotFound,
            ServiceError::InvalidInput(_) => HandlerErrorKind::BadRequest,
            ServiceError::Unauthorized(_) => HandlerErrorKind::Unauthorized,
            ServiceError::Forbidden(_) => HandlerErrorKind::Forbidden,
            ServiceError::Conflict(_) => HandlerErrorKind::Conflict,
            ServiceError::InternalError(_) => HandlerErrorKind::Internal,
        };
        HandlerError::new(kind, err.into_message())
    }
}


#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    NotFound(String),
    InvalidInput(String),
    Unauthorized(String),
    Forbidden(String),
    InternalError(String),
    Conflict(String),
}

impl ServiceError {
    pub fn message(&self) -> &str {
        match self {
            ServiceError::NotFound(m)
            | ServiceError::InvalidInput(m)
            | ServiceError::Unauthorized(m)
            | ServiceError::Forbidden(m)
            | ServiceError::InternalError(m)
            | ServiceError::Conflict(m) => m,
        }
    }

    pub fn into_message(self) -> String {
        match self {
            ServiceError::NotFound(m)
            | ServiceError::InvalidInput(m)
            | ServiceError::Unauthorized(m)
            | ServiceError::Forbidden(m)
            | ServiceError::InternalError(m)
            | ServiceError::Conflict(m) => m,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ServiceError::InvalidInput(msg) => write!(f, "Invalid Input: {}", msg),
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServiceError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ServiceError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            ServiceError::Conflict(msg) => write!(f, "Conflict: {}", msg),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => ServiceError::NotFound(msg),
            RepositoryError::ValidationError(msg) => ServiceError::InvalidInput(msg),
            RepositoryError::AlreadyExists(msg) => ServiceError::Conflict(msg),
            RepositoryError::DatabaseError(msg) => ServiceError::InternalError(msg),
            RepositoryError::ConnectionError(msg) => ServiceError::InternalError(msg),
            RepositoryError::SerializationError(msg) => ServiceError::InternalError(msg),
            RepositoryError::Generic(e) => ServiceError::InternalError(e.to_string()),
        }
    }
}

/// Parse a 24-char hex id coming from a path or body.
pub fn parse_object_id(raw: &str, what: &str) -> Result<bson::oid::ObjectId, ServiceError> {
    bson::oid::ObjectId::parse_str(raw.trim())
        .map_err(|_| ServiceError::InvalidInput(format!("Invalid {} id", what)))
}

impl From<crate::util::otp::OtpError> for ServiceError {
    fn from(err: crate::util::otp::OtpError) -> Self {
        use crate::util::otp::OtpError;
        match err {
            OtpError::Invalid | OtpError::Expired => ServiceError::InvalidInput(err.to_string()),
            other => ServiceError::InternalError(other.to_string()),
        }
    }
}

impl From<crate::util::jwt::JwtError> for ServiceError {
    fn from(err: crate::util::jwt::JwtError) -> Self {
        use crate::util::jwt::JwtError;
        match err {
            JwtError::EncodingFailed(msg) => ServiceError::InternalError(format!("JWT error: {}", msg)),
            JwtError::TokenExpired => ServiceError::Unauthorized("Token has expired".to_string()),
            _ => ServiceError::Unauthorized("Invalid token".to_string()),
        }
    }
}

impl From<crate::util::password::PasswordError> for ServiceError {
    fn from(err: crate::util::password::PasswordError) -> Self {
        ServiceError::InternalError(err.to_string())
    }
}
