//! Application Configuration
//!
//! Configuration for the registration pipeline and session credentials.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use platform::password::PasswordParams;
use rust_decimal::Decimal;

/// Longest session lifetime accepted from configuration (one year)
pub const MAX_SESSION_TTL: Duration = Duration::from_secs(365 * 24 * 3600);

/// Account application configuration
#[derive(Clone)]
pub struct AccountConfig {
    /// Session secret key for HMAC signing (32 bytes)
    pub session_secret: [u8; 32],
    /// Session credential lifetime (1 day)
    pub session_ttl: Duration,
    /// Argon2id work factor
    pub password_params: PasswordParams,
    /// Accounts an origin address may own before registration is refused
    pub max_accounts_per_origin: u64,
    /// Identity code candidates tried before giving up
    pub identity_attempts: u32,
    /// Bonus credited to `bonus_balance` at registration
    pub signup_bonus: Decimal,
    /// Token required for privileged registration; `None` disables it
    pub admin_registration_token: Option<String>,
    /// Reverse proxies whose `X-Forwarded-For` is honored
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            session_secret: [0u8; 32],
            session_ttl: Duration::from_secs(24 * 3600), // 1 day
            password_params: PasswordParams::default(),
            max_accounts_per_origin: 3,
            identity_attempts: 10,
            signup_bonus: Decimal::ZERO,
            admin_registration_token: None,
            trusted_proxies: Vec::new(),
        }
    }
}

impl AccountConfig {
    /// Create config with a random session secret
    pub fn with_random_secret() -> Self {
        let mut secret = [0u8; 32];
        secret.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            session_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (cheap password hashing)
    pub fn development() -> Self {
        Self {
            password_params: PasswordParams::minimal(),
            ..Self::with_random_secret()
        }
    }

    pub fn session_ttl_secs(&self) -> i64 {
        i64::try_from(self.session_ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("session_secret", &"[REDACTED]")
            .field("session_ttl", &self.session_ttl)
            .field("password_params", &self.password_params)
            .field("max_accounts_per_origin", &self.max_accounts_per_origin)
            .field("identity_attempts", &self.identity_attempts)
            .field("signup_bonus", &self.signup_bonus)
            .field(
                "admin_registration_token",
                &self.admin_registration_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("trusted_proxies", &self.trusted_proxies)
            .finish()
    }
}
