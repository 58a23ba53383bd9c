//! Application Error
//!
//! [`AppError`] is what every failure becomes before a response is written:
//! a kind, a message safe to show, an optional hint, and the cause for logs.

use std::borrow::Cow;
use std::error::Error as StdError;

use thiserror::Error;

use super::kind::ErrorKind;

type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// Unified application error
///
/// ```rust
/// use kernel::error::app_error::AppError;
///
/// let err = AppError::bad_gateway("Mail delivery failed").with_action("Please try again later");
/// assert_eq!(err.status_code(), 502);
/// assert_eq!(err.action(), Some("Please try again later"));
/// ```
#[derive(Debug, Error)]
#[error("[{kind}] {message}")]
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    action: Option<Cow<'static, str>>,
    #[source]
    cause: Option<BoxedCause>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
            cause: None,
        }
    }

    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    pub fn bad_gateway(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::BadGateway, message)
    }

    pub fn service_unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Hint telling the user what to do next
    pub fn with_action(mut self, action: impl Into<Cow<'static, str>>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Keep the underlying error for logs; it is never rendered
    pub fn with_source<E>(mut self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_pick_kind() {
        assert_eq!(AppError::bad_request("x").kind(), ErrorKind::BadRequest);
        assert_eq!(AppError::unauthorized("x").kind(), ErrorKind::Unauthorized);
        assert_eq!(AppError::not_found("x").status_code(), 404);
        assert_eq!(AppError::conflict("x").status_code(), 409);
        assert!(AppError::internal("x").is_server_error());
        assert_eq!(AppError::service_unavailable("x").status_code(), 503);
    }

    #[test]
    fn test_cause_kept_but_not_displayed() {
        let err = AppError::bad_gateway("Mail delivery failed")
            .with_action("Please try again later")
            .with_source(std::io::Error::other("smtp down"));

        assert_eq!(err.to_string(), "[Bad Gateway] Mail delivery failed");
        assert_eq!(err.message(), "Mail delivery failed");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("smtp down"));
    }
}
