//! Domain Layer
//!
//! Contains entities, value objects, referral rules, and repository traits.

pub mod entity;
pub mod referral;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::account::Account;
pub use repository::AccountRepository;
