//! Domain Layer
//!
//! Settlement orders, the callback payload, and the repository trait.

pub mod callback;
pub mod order;
pub mod repository;

pub use callback::CallbackPayload;
pub use order::{OrderStatus, SettlementOrder, SettlementOutcome};
pub use repository::SettlementRepository;
