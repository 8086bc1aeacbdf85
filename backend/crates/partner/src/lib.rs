//! Partner Integration Module
//!
//! Outbound side of the external integrations:
//! - `key` - time-scoped provisioning key derivation
//! - `client` - game-platform provisioning calls (signed REGISTER, CreateMember)
//! - `notify` - ops chat notifications
//! - `jobs` - background job payloads and their queue handlers
//!
//! ## Failure Model
//! Every call here is best-effort. Failures are logged and dropped; nothing in
//! this crate can fail a registration or a settlement that already committed.

pub mod client;
pub mod config;
pub mod error;
pub mod jobs;
pub mod key;
pub mod notify;

// Re-exports for convenience
pub use client::ProvisioningClient;
pub use config::{NotifierConfig, PartnerConfig};
pub use error::{PartnerError, PartnerResult};
pub use jobs::{Notification, ProvisioningJob};
pub use key::{KeyFraming, date_token, derive_key};
pub use notify::ChatNotifier;
