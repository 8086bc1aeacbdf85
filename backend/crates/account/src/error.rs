//! Account Error Types
//!
//! Registration and session errors that integrate with the unified
//! `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use thiserror::Error;

use crate::domain::value_object::ValueError;

/// Account-specific result type alias
pub type AccountResult<T> = Result<T, AccountError>;

#[derive(Debug, Error)]
pub enum AccountError {
    /// Phone number already registered under the dial code
    #[error("Registered phone number")]
    DuplicatePhone,

    /// Referral code does not resolve to an account
    #[error("Invalid invite code")]
    InvalidReferrer,

    /// Origin address already owns the maximum number of accounts
    #[error("Too many accounts registered from this address")]
    TooManyAccountsFromOrigin,

    /// No free identity code within the attempt budget
    #[error("Could not allocate an account identity, retry later")]
    IdentityExhausted,

    /// Identity or referral code collided on insert
    #[error("Identity code already taken")]
    IdentityTaken,

    /// Rejected input
    #[error("{0}")]
    Validation(String),

    /// Privileged registration without a matching admin token
    #[error("Privileged registration is not allowed")]
    PrivilegeDenied,

    /// Session credential missing, malformed, expired, or unknown
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccountError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::DuplicatePhone => ErrorKind::Conflict,
            AccountError::InvalidReferrer => ErrorKind::UnprocessableEntity,
            AccountError::TooManyAccountsFromOrigin => ErrorKind::TooManyRequests,
            AccountError::IdentityExhausted => ErrorKind::ServiceUnavailable,
            AccountError::Validation(_) => ErrorKind::BadRequest,
            AccountError::PrivilegeDenied => ErrorKind::Forbidden,
            AccountError::SessionInvalid => ErrorKind::Unauthorized,
            AccountError::IdentityTaken | AccountError::Database(_) | AccountError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::DuplicatePhone => "DUPLICATE_PHONE",
            AccountError::InvalidReferrer => "INVALID_REFERRER",
            AccountError::TooManyAccountsFromOrigin => "TOO_MANY_ACCOUNTS_FROM_ORIGIN",
            AccountError::IdentityExhausted => "IDENTITY_EXHAUSTED",
            AccountError::Validation(_) => "VALIDATION_ERROR",
            AccountError::PrivilegeDenied => "PRIVILEGE_DENIED",
            AccountError::SessionInvalid => "SESSION_INVALID",
            AccountError::IdentityTaken | AccountError::Database(_) | AccountError::Internal(_) => {
                "INTERNAL_ERROR"
            }
        }
    }

    /// Internal details never reach the client
    pub fn to_app_error(&self) -> AppError {
        let message = match self.kind() {
            ErrorKind::InternalServerError => "Internal server error".to_string(),
            _ => self.to_string(),
        };
        AppError::new(self.kind(), message).with_code(self.code())
    }

    fn log(&self) {
        match self {
            AccountError::Database(e) => {
                tracing::error!(error = %e, "Account database error");
            }
            AccountError::Internal(msg) => {
                tracing::error!(message = %msg, "Account internal error");
            }
            AccountError::IdentityTaken | AccountError::IdentityExhausted => {
                tracing::error!(error = %self, "Identity allocation failed");
            }
            AccountError::TooManyAccountsFromOrigin | AccountError::PrivilegeDenied => {
                tracing::warn!(error = %self, "Registration refused");
            }
            _ => {
                tracing::debug!(error = %self, "Account error");
            }
        }
    }
}

impl IntoResponse for AccountError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<ValueError> for AccountError {
    fn from(err: ValueError) -> Self {
        AccountError::Validation(err.to_string())
    }
}

impl From<PasswordPolicyError> for AccountError {
    fn from(err: PasswordPolicyError) -> Self {
        AccountError::Validation(err.to_string())
    }
}

impl From<PasswordHashError> for AccountError {
    fn from(err: PasswordHashError) -> Self {
        AccountError::Internal(err.to_string())
    }
}
