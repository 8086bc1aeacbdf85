//! Presentation Layer
//!
//! Callback body extractor, handler, and router.

pub mod extract;
pub mod handlers;
pub mod router;

pub use handlers::PaymentAppState;
pub use router::{payment_router, payment_router_generic};
