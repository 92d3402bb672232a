//! Error handling middleware - RFC 7807 compliant responses.

use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use roster_core::{DomainError, ErrorKind};
use roster_shared::ErrorResponse;
use std::fmt;

use crate::observability::RequestId;

/// What went wrong, in transport terms.
#[derive(Debug)]
pub enum Problem {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden,
    Conflict(String),
    /// Never shown to the caller.
    Internal(String),
}

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug)]
pub struct AppError {
    pub problem: Problem,
    pub request_id: Option<String>,
}

impl AppError {
    pub fn new(problem: Problem) -> Self {
        Self {
            problem,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: &RequestId) -> Self {
        self.request_id = Some(request_id.as_str().to_string());
        self
    }

    fn code(&self) -> &'static str {
        match self.problem {
            Problem::NotFound(_) => ErrorKind::NotFound.as_str(),
            Problem::BadRequest(_) => ErrorKind::Validation.as_str(),
            Problem::Unauthorized => ErrorKind::Unauthorized.as_str(),
            Problem::Forbidden => ErrorKind::Forbidden.as_str(),
            Problem::Conflict(_) => ErrorKind::Conflict.as_str(),
            Problem::Internal(_) => ErrorKind::Internal.as_str(),
        }
    }

    /// Error handler for malformed JSON bodies and query strings.
    pub fn malformed_request(err: impl fmt::Display, req: &HttpRequest) -> actix_web::Error {
        let mut error = AppError::new(Problem::BadRequest(format!("invalid request: {err}")));
        error.request_id = RequestId::of(req).map(|id| id.0);
        error.into()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.problem {
            Problem::NotFound(msg) => write!(f, "Not found: {}", msg),
            Problem::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Problem::Unauthorized => write!(f, "Unauthorized"),
            Problem::Forbidden => write!(f, "Forbidden"),
            Problem::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Problem::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.problem {
            Problem::NotFound(_) => StatusCode::NOT_FOUND,
            Problem::BadRequest(_) => StatusCode::BAD_REQUEST,
            Problem::Unauthorized => StatusCode::UNAUTHORIZED,
            Problem::Forbidden => StatusCode::FORBIDDEN,
            Problem::Conflict(_) => StatusCode::CONFLICT,
            Problem::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match &self.problem {
            Problem::NotFound(detail) => ErrorResponse::not_found(detail),
            Problem::BadRequest(detail) => ErrorResponse::bad_request(detail),
            Problem::Unauthorized => ErrorResponse::unauthorized(),
            Problem::Forbidden => ErrorResponse::forbidden(),
            Problem::Conflict(detail) => ErrorResponse::conflict(detail),
            Problem::Internal(detail) => {
                // Log internal errors
                tracing::error!(request_id = ?self.request_id, "Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        let error = error.with_code(self.code());
        let error = match &self.request_id {
            Some(id) => error.with_request_id(id.clone()),
            None => error,
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        let problem = match &err {
            DomainError::Validation(_) => Problem::BadRequest(err.public_message()),
            DomainError::NotFound(msg) => Problem::NotFound(msg.clone()),
            DomainError::Conflict(msg) => Problem::Conflict(msg.clone()),
            DomainError::Unauthorized(_) => Problem::Unauthorized,
            DomainError::Forbidden(_) => Problem::Forbidden,
            DomainError::Internal { .. } => Problem::Internal(error_chain(&err)),
        };
        AppError::new(problem)
    }
}

/// Render an error and all its sources for server-side logs.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Attach the request id to a failed service call.
pub trait ScopedResult<T> {
    fn scoped(self, request_id: &RequestId) -> AppResult<T>;
}

impl<T> ScopedResult<T> for Result<T, DomainError> {
    fn scoped(self, request_id: &RequestId) -> AppResult<T> {
        self.map_err(|e| AppError::from(e).with_request_id(request_id))
    }
}
