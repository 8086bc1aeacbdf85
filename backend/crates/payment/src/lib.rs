//! Payment Backend Module
//!
//! Accepts settlement callbacks from the payment gateway, verifies their
//! signature, and credits each order exactly once.
//!
//! - `domain/` - Settlement orders, callback payload, repository trait
//! - `application/` - Callback use case and configuration
//! - `infra/` - Database implementation
//! - `presentation/` - Body extractor, handler, router

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::PaymentConfig;
pub use error::{PaymentError, PaymentResult};
pub use infra::postgres::PgSettlementRepository;
pub use presentation::router::payment_router;
