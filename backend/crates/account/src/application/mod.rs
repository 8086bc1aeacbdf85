//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod register;
pub mod session_token;

// Re-exports
pub use check_session::CheckSessionUseCase;
pub use config::AccountConfig;
pub use register::{ProvisioningStatus, RegisterInput, RegisterOutput, RegisterUseCase};
pub use session_token::{SessionClaims, SessionToken};
