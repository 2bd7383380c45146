use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

/// Boxed cause carried by [`EventError::Internal`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Classification of an [`EventError`]. Each kind maps to exactly one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    /// Reserved, no current flow produces it
    Unauthorized,
    AccessDenied,
    NotFound,
    Internal,
    /// Reserved for transient business-rule failures
    Unavailable,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::Validation,
        ErrorKind::Unauthorized,
        ErrorKind::AccessDenied,
        ErrorKind::NotFound,
        ErrorKind::Internal,
        ErrorKind::Unavailable,
    ];

    pub const fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::AccessDenied => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Unavailable: {0}")]
    Unavailable(String),
}

pub type EventResult<T> = Result<T, EventError>;

impl EventError {
    pub fn validation(message: impl Into<String>) -> Self {
        EventError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        EventError::NotFound(message.into())
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        EventError::AccessDenied(message.into())
    }

    /// Wraps an unexpected failure; `source` is kept for diagnostics only.
    pub fn internal(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        EventError::Internal {
            message: message.into(),
            source: source.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EventError::Validation(_) => ErrorKind::Validation,
            EventError::Unauthorized(_) => ErrorKind::Unauthorized,
            EventError::AccessDenied(_) => ErrorKind::AccessDenied,
            EventError::NotFound(_) => ErrorKind::NotFound,
            EventError::Internal { .. } => ErrorKind::Internal,
            EventError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// Client-facing message, without the cause of internal errors.
    pub fn message(&self) -> &str {
        match self {
            EventError::Validation(msg)
            | EventError::Unauthorized(msg)
            | EventError::AccessDenied(msg)
            | EventError::NotFound(msg)
            | EventError::Unavailable(msg) => msg,
            EventError::Internal { message, .. } => message,
        }
    }
}

/// Convert EventError to AppError for standardized error responses
impl From<EventError> for AppError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::Validation(msg) => AppError::BadRequest(msg),
            EventError::Unauthorized(msg) => AppError::Unauthorized(msg),
            EventError::AccessDenied(msg) => AppError::Forbidden(msg),
            EventError::NotFound(msg) => AppError::NotFound(msg),
            EventError::Internal { message, source } => {
                tracing::error!(error = %source, "{}", message);
                AppError::InternalServerError(message)
            }
            EventError::Unavailable(msg) => AppError::ServiceUnavailable(msg),
        }
    }
}

impl IntoResponse for EventError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    fn sample(kind: ErrorKind) -> EventError {
        match kind {
            ErrorKind::Validation => EventError::validation("bad"),
            ErrorKind::Unauthorized => EventError::Unauthorized("who".into()),
            ErrorKind::AccessDenied => EventError::access_denied("nope"),
            ErrorKind::NotFound => EventError::not_found("gone"),
            ErrorKind::Internal => EventError::internal("boom", EventError::Unavailable("x".into())),
            ErrorKind::Unavailable => EventError::Unavailable("later".into()),
        }
    }

    #[test]
    fn test_status_table() {
        let expected = [400, 401, 403, 404, 500, 503];
        for (kind, status) in ErrorKind::ALL.into_iter().zip(expected) {
            assert_eq!(kind.status_code().as_u16(), status, "{:?}", kind);
        }
    }

    #[test]
    fn test_app_error_status_matches_kind() {
        for kind in ErrorKind::ALL {
            let err = sample(kind);
            assert_eq!(err.kind(), kind);
            let app_error = AppError::from(err);
            assert_eq!(app_error.status_code(), kind.status_code());
        }
    }

    #[test]
    fn test_internal_keeps_cause_out_of_message() {
        let err = EventError::internal(
            "failed to create event",
            EventError::Unavailable("store offline".into()),
        );

        assert_eq!(err.message(), "failed to create event");
        let source = err.source().unwrap();
        assert!(source.to_string().contains("store offline"));
    }
}
