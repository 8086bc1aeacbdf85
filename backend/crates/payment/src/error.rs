//! Payment Error Types
//!
//! Callback rejections that integrate with the unified
//! `kernel::error::AppError` system. Authenticity failures use fixed messages
//! that reveal nothing about the expected signature.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Payment-specific result type alias
pub type PaymentResult<T> = Result<T, PaymentError>;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// `sign` absent or empty
    #[error("fail(sign not exists)")]
    MissingSignature,

    /// Recomputed signature differs
    #[error("fail(verify fail)")]
    SignatureMismatch,

    /// Malformed or incomplete callback
    #[error("{0}")]
    Validation(String),

    /// Unknown merchant order number
    #[error("No data found for the provided Order ID")]
    OrderNotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::MissingSignature
            | PaymentError::SignatureMismatch
            | PaymentError::Validation(_) => ErrorKind::BadRequest,
            PaymentError::OrderNotFound => ErrorKind::NotFound,
            PaymentError::Database(_) | PaymentError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::MissingSignature => "MISSING_SIGNATURE",
            PaymentError::SignatureMismatch => "SIGNATURE_MISMATCH",
            PaymentError::Validation(_) => "VALIDATION_ERROR",
            PaymentError::OrderNotFound => "ORDER_NOT_FOUND",
            PaymentError::Database(_) | PaymentError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn to_app_error(&self) -> AppError {
        let message = match self.kind() {
            ErrorKind::InternalServerError => "Internal server error".to_string(),
            _ => self.to_string(),
        };
        AppError::new(self.kind(), message).with_code(self.code())
    }

    fn log(&self) {
        match self {
            PaymentError::Database(e) => {
                tracing::error!(error = %e, "Settlement database error");
            }
            PaymentError::Internal(msg) => {
                tracing::error!(message = %msg, "Settlement internal error");
            }
            PaymentError::MissingSignature | PaymentError::SignatureMismatch => {
                tracing::warn!(error = %self, "Callback authenticity check failed");
            }
            _ => {
                tracing::debug!(error = %self, "Callback rejected");
            }
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}
