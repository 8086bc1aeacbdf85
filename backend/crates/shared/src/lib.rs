//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the error vocabulary shared by every backend crate:
//! - [`error::kind::ErrorKind`] - HTTP status classification
//! - [`error::app_error::AppError`] - unified error with a stable machine code
//! - the axum response shape
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
