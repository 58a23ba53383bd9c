//! Users Error Types
//!
//! Every failure of the user controller is a [`UsersError`]. Validation
//! conflicts and bad form input are turned into flash messages by the
//! handlers; everything else reaches the central `IntoResponse` below, which
//! logs it and renders a problem document through `kernel::AppError`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::PasswordPolicyError;
use thiserror::Error;

pub type UsersResult<T> = Result<T, UsersError>;

/// Account attributes that must be unique across users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Name,
    Email,
    Phone,
    Linkedin,
    ProviderSubject,
}

impl UniqueField {
    /// Flash text shown on the registration form
    pub fn flash_message(&self) -> &'static str {
        match self {
            UniqueField::Name => "Username already taken.",
            UniqueField::Email => "Email already taken.",
            UniqueField::Phone => "Phone Number already taken.",
            UniqueField::Linkedin => "linkedIn already taken.",
            UniqueField::ProviderSubject => "Account already linked.",
        }
    }

    /// Name of the unique constraint guarding this field in `users`
    pub fn constraint(&self) -> &'static str {
        match self {
            UniqueField::Name => "users_name_key",
            UniqueField::Email => "users_email_key",
            UniqueField::Phone => "users_phone_key",
            UniqueField::Linkedin => "users_linkedin_key",
            UniqueField::ProviderSubject => "users_provider_subject_key",
        }
    }

    pub fn from_constraint(name: &str) -> Option<Self> {
        [
            UniqueField::Name,
            UniqueField::Email,
            UniqueField::Phone,
            UniqueField::Linkedin,
            UniqueField::ProviderSubject,
        ]
        .into_iter()
        .find(|field| field.constraint() == name)
    }
}

#[derive(Debug, Error)]
pub enum UsersError {
    #[error("User not found")]
    UserNotFound,

    /// Unique attribute already used by another account
    #[error("{}", .0.flash_message())]
    Taken(UniqueField),

    /// Unknown name or wrong password; deliberately indistinguishable
    #[error("Username or Password is incorrect")]
    InvalidCredentials,

    #[error("Login required")]
    LoginRequired,

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    PasswordPolicy(#[from] PasswordPolicyError),

    #[error("Identity provider is not configured")]
    ProviderDisabled,

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl UsersError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            UsersError::UserNotFound => ErrorKind::NotFound,
            UsersError::Taken(_) => ErrorKind::Conflict,
            UsersError::InvalidCredentials | UsersError::LoginRequired => ErrorKind::Unauthorized,
            UsersError::InvalidInput(_) | UsersError::PasswordPolicy(_) => ErrorKind::BadRequest,
            UsersError::ProviderDisabled => ErrorKind::ServiceUnavailable,
            UsersError::Provider(_) | UsersError::Mail(_) => ErrorKind::BadGateway,
            UsersError::Database(_) | UsersError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Text for the one-shot flash message, for errors reported by redirect
    pub fn flash_message(&self) -> Option<String> {
        match self {
            UsersError::Taken(_)
            | UsersError::InvalidCredentials
            | UsersError::InvalidInput(_)
            | UsersError::PasswordPolicy(_) => Some(self.to_string()),
            _ => None,
        }
    }

    /// Problem document for the response; store and internal details stay
    /// in the cause, which is only logged.
    pub fn into_app_error(self) -> AppError {
        match self {
            UsersError::UserNotFound => AppError::not_found(self.to_string()),
            UsersError::Taken(field) => AppError::conflict(field.flash_message()),
            UsersError::InvalidCredentials => AppError::unauthorized(self.to_string()),
            UsersError::LoginRequired => {
                AppError::unauthorized("Login required").with_action("Please log in")
            }
            UsersError::InvalidInput(msg) => AppError::bad_request(msg),
            UsersError::PasswordPolicy(e) => AppError::bad_request(e.to_string()).with_source(e),
            UsersError::ProviderDisabled => AppError::service_unavailable(self.to_string()),
            UsersError::Provider(_) => AppError::bad_gateway("Identity provider error")
                .with_action("Please sign in again"),
            UsersError::Mail(_) => AppError::bad_gateway("Mail delivery failed")
                .with_action("Please try again later"),
            UsersError::Database(e) => AppError::internal("Database error").with_source(e),
            UsersError::Internal(_) => AppError::internal("Internal error"),
        }
    }

    fn log(&self) {
        match self {
            UsersError::Database(e) => {
                tracing::error!(error = %e, "Users database error");
            }
            UsersError::Internal(msg) => {
                tracing::error!(message = %msg, "Users internal error");
            }
            UsersError::Mail(msg) => {
                tracing::error!(message = %msg, "Mail transport error");
            }
            UsersError::Provider(msg) => {
                tracing::warn!(message = %msg, "Identity provider error");
            }
            UsersError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            _ => {
                tracing::debug!(error = %self, "Users error");
            }
        }
    }
}

impl IntoResponse for UsersError {
    fn into_response(self) -> Response {
        self.log();
        self.into_app_error().into_response()
    }
}

impl From<AppError> for UsersError {
    fn from(err: AppError) -> Self {
        if err.is_server_error() {
            UsersError::Internal(err.to_string())
        } else {
            UsersError::InvalidInput(err.message().to_string())
        }
    }
}
