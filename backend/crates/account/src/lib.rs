//! Account Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, referral rules, repository traits
//! - `application/` - Registration and session use cases
//! - `infra/` - Database implementation
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Phone registration under a referral code, one account per (phone, dial code)
//! - Per-origin account limit, bypassed by admin-token privileged registration
//! - Referrer tier ladder and flattened attribution
//! - Signed session credential; only its SHA-256 digest is stored
//! - Partner provisioning handed to a bounded background queue

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{AccountConfig, MAX_SESSION_TTL};
pub use error::{AccountError, AccountResult};
pub use infra::postgres::PgAccountRepository;
pub use presentation::router::account_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

#[cfg(test)]
mod tests;
