//! Environment Configuration
//!
//! Reads every setting once at startup and hands plain config structs to the
//! crates. Secrets are required in release builds; debug builds fall back to
//! development values so the server starts with only `DATABASE_URL` set.

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use account::{AccountConfig, MAX_SESSION_TTL};
use anyhow::{Context, bail};
use base64::Engine;
use base64::engine::general_purpose;
use partner::{KeyFraming, NotifierConfig, PartnerConfig};
use payment::PaymentConfig;
use platform::password::PasswordParams;
use platform::queue::QueueConfig;
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub account: AccountConfig,
    pub payment: PaymentConfig,
    pub partner: PartnerConfig,
    pub notifier: NotifierConfig,
    pub queue: QueueConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let bind_addr = parse_or("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 31113)))?;

        let frontend_origins = env::var("FRONTEND_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string())
            .split(',')
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            account: account_config()?,
            payment: payment_config()?,
            partner: partner_config()?,
            notifier: notifier_config()?,
            queue: QueueConfig {
                capacity: parse_or("JOB_QUEUE_CAPACITY", QueueConfig::default().capacity)?,
                ..QueueConfig::default()
            },
        })
    }
}

fn account_config() -> anyhow::Result<AccountConfig> {
    let base = match env::var("SESSION_SECRET") {
        Ok(secret_b64) => {
            let secret_bytes = general_purpose::STANDARD
                .decode(secret_b64.trim())
                .context("SESSION_SECRET must be base64")?;
            let secret: [u8; 32] = secret_bytes
                .as_slice()
                .try_into()
                .context("SESSION_SECRET must decode to 32 bytes")?;
            AccountConfig {
                session_secret: secret,
                ..AccountConfig::default()
            }
        }
        Err(_) if cfg!(debug_assertions) => {
            tracing::warn!("SESSION_SECRET not set, using a random development secret");
            AccountConfig::development()
        }
        Err(_) => bail!("SESSION_SECRET must be set in production"),
    };

    let defaults = base.password_params;
    let password_params = PasswordParams {
        memory_kib: parse_or("PASSWORD_MEMORY_KIB", defaults.memory_kib)?,
        iterations: parse_or("PASSWORD_ITERATIONS", defaults.iterations)?,
        parallelism: parse_or("PASSWORD_PARALLELISM", defaults.parallelism)?,
    };

    Ok(AccountConfig {
        session_ttl: session_ttl(parse_or("SESSION_TTL_SECS", base.session_ttl.as_secs())?)?,
        password_params,
        max_accounts_per_origin: parse_or("MAX_ACCOUNTS_PER_ORIGIN", base.max_accounts_per_origin)?,
        identity_attempts: parse_or("IDENTITY_ATTEMPTS", base.identity_attempts)?,
        signup_bonus: parse_or::<Decimal>("SIGNUP_BONUS", base.signup_bonus)?,
        admin_registration_token: optional("ADMIN_REGISTRATION_TOKEN"),
        trusted_proxies: trusted_proxies(optional("TRUSTED_PROXIES").as_deref().unwrap_or(""))?,
        ..base
    })
}

/// Session lifetime in `1..=MAX_SESSION_TTL` seconds
fn session_ttl(secs: u64) -> anyhow::Result<Duration> {
    let ttl = Duration::from_secs(secs);
    if secs == 0 || ttl > MAX_SESSION_TTL {
        bail!(
            "SESSION_TTL_SECS must be between 1 and {}",
            MAX_SESSION_TTL.as_secs()
        );
    }
    Ok(ttl)
}

/// Comma-separated proxy addresses, IPv4-mapped IPv6 folded to IPv4
fn trusted_proxies(raw: &str) -> anyhow::Result<Vec<IpAddr>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<IpAddr>()
                .map(|ip| ip.to_canonical())
                .with_context(|| format!("TRUSTED_PROXIES entry {s:?} is not an IP address"))
        })
        .collect()
}

fn payment_config() -> anyhow::Result<PaymentConfig> {
    match optional("MERCHANT_SECRET") {
        Some(secret) => Ok(PaymentConfig::new(secret)),
        None if cfg!(debug_assertions) => {
            tracing::warn!("MERCHANT_SECRET not set, using the development merchant key");
            Ok(PaymentConfig::development())
        }
        None => bail!("MERCHANT_SECRET must be set in production"),
    }
}

fn partner_config() -> anyhow::Result<PartnerConfig> {
    let defaults = PartnerConfig::default();
    let default_framing = KeyFraming::default();

    Ok(PartnerConfig {
        api_url: optional("PARTNER_API_URL").unwrap_or_default(),
        pid: optional("PARTNER_PID").unwrap_or_default(),
        version: optional("PARTNER_VERSION").unwrap_or_default(),
        api_secret: optional("PARTNER_API_SECRET").unwrap_or_default(),
        agent_url: optional("PARTNER_AGENT_URL").unwrap_or_default(),
        agent_id: optional("PARTNER_AGENT_ID").unwrap_or_default(),
        agent_secret: optional("PARTNER_AGENT_SECRET").unwrap_or_default(),
        org: parse_or("PARTNER_ORG", defaults.org)?,
        key_framing: KeyFraming {
            prefix: optional("PARTNER_KEY_PREFIX").unwrap_or(default_framing.prefix),
            suffix: optional("PARTNER_KEY_SUFFIX").unwrap_or(default_framing.suffix),
        },
        timeout: Duration::from_secs(parse_or(
            "PARTNER_TIMEOUT_SECS",
            defaults.timeout.as_secs(),
        )?),
    })
}

fn notifier_config() -> anyhow::Result<NotifierConfig> {
    let defaults = NotifierConfig::default();

    Ok(NotifierConfig {
        bot_token: optional("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
        chat_id: optional("TELEGRAM_CHAT_ID").unwrap_or_default(),
        timeout: Duration::from_secs(parse_or(
            "PARTNER_TIMEOUT_SECS",
            defaults.timeout.as_secs(),
        )?),
        ..defaults
    })
}

/// Non-empty value of `name`
fn optional(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `name` if set, otherwise `default`
fn parse_or<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow::anyhow!("{name} is invalid: {e}")),
        None => Ok(default),
    }
}
