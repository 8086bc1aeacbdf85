//! Application Layer

pub mod config;
pub mod handle_callback;

pub use config::PaymentConfig;
pub use handle_callback::{CallbackAck, HandleCallbackUseCase};
