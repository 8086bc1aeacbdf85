//! Provisioning Key Derivation
//!
//! The agent API authenticates CreateMember with a key derived from the agent
//! secret, the calendar day on the partner's clock and the account being
//! created. The secret itself never leaves this process.
//!
//! ```text
//! date   = YY ++ M ++ D              (UTC-4, month/day not zero-padded)
//! inner  = md5(date ++ agent_id ++ agent_secret)
//! body   = md5("Account=" ++ account ++ "&AgentId=" ++ agent_id ++ inner)
//! key    = prefix ++ body ++ suffix
//! ```

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use platform::crypto::md5_hex;

/// Partner clock offset west of UTC, in hours
const PARTNER_UTC_OFFSET_HOURS: i64 = 4;

/// Six-character framing the agent API expects around the digest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFraming {
    pub prefix: String,
    pub suffix: String,
}

impl Default for KeyFraming {
    fn default() -> Self {
        Self {
            prefix: "123456".to_string(),
            suffix: "abcdef".to_string(),
        }
    }
}

/// Day token on the partner's clock, e.g. `"24121"` for 2024-12-01
pub fn date_token(at: DateTime<Utc>) -> String {
    let local = at.naive_utc() - TimeDelta::hours(PARTNER_UTC_OFFSET_HOURS);
    format!(
        "{:02}{}{}",
        local.year().rem_euclid(100),
        local.month(),
        local.day()
    )
}

/// Derive the CreateMember key for `account_id` at instant `at`
pub fn derive_key(
    account_id: &str,
    agent_id: &str,
    agent_secret: &str,
    at: DateTime<Utc>,
    framing: &KeyFraming,
) -> String {
    let inner = md5_hex(format!("{}{}{}", date_token(at), agent_id, agent_secret).as_bytes());
    let body = md5_hex(format!("Account={}&AgentId={}{}", account_id, agent_id, inner).as_bytes());

    format!("{}{}{}", framing.prefix, body, framing.suffix)
}
