//! Application Configuration

use std::fmt;

/// Secret field name the gateway appends to its canonical string
pub const GATEWAY_SECRET_FIELD: &str = "key";

#[derive(Clone, Default)]
pub struct PaymentConfig {
    /// Merchant key shared with the payment gateway
    pub merchant_secret: String,
}

impl PaymentConfig {
    pub fn new(merchant_secret: impl Into<String>) -> Self {
        Self {
            merchant_secret: merchant_secret.into(),
        }
    }

    /// Fixed secret for local runs
    pub fn development() -> Self {
        Self::new("development-merchant-key")
    }
}

impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("merchant_secret", &"[REDACTED]")
            .finish()
    }
}
