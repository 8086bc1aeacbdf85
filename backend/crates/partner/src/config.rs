//! Partner Configuration
//!
//! Credentials for the game platform and the ops chat. All values come from
//! the environment at startup; nothing here is read from process state later.

use std::fmt;
use std::time::Duration;

use crate::key::KeyFraming;

/// Game-platform integration settings
#[derive(Clone)]
pub struct PartnerConfig {
    /// Endpoint receiving the signed REGISTER call
    pub api_url: String,
    /// Merchant id sent as `pid`
    pub pid: String,
    /// Protocol version sent as `ver`
    pub version: String,
    /// Secret appended as `apikey=` when signing
    pub api_secret: String,
    /// Base URL of the agent API (`{agent_url}/CreateMember`)
    pub agent_url: String,
    pub agent_id: String,
    /// Never sent; only used to derive provisioning keys
    pub agent_secret: String,
    /// `org` value sent on REGISTER
    pub org: u32,
    /// Framing around derived keys
    pub key_framing: KeyFraming,
    /// Per-request timeout for every outbound call
    pub timeout: Duration,
}

impl Default for PartnerConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            pid: String::new(),
            version: String::new(),
            api_secret: String::new(),
            agent_url: String::new(),
            agent_id: String::new(),
            agent_secret: String::new(),
            org: 1,
            key_framing: KeyFraming::default(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl PartnerConfig {
    /// Whether the signed REGISTER call can be made
    ///
    /// `pid` and `ver` are signed fields, so they must be set as well.
    pub fn register_enabled(&self) -> bool {
        !self.api_url.is_empty()
            && !self.api_secret.is_empty()
            && !self.pid.is_empty()
            && !self.version.is_empty()
    }

    /// Whether CreateMember can be made
    pub fn create_member_enabled(&self) -> bool {
        !self.agent_url.is_empty() && !self.agent_id.is_empty() && !self.agent_secret.is_empty()
    }

    pub fn create_member_url(&self) -> String {
        format!("{}/CreateMember", self.agent_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for PartnerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartnerConfig")
            .field("api_url", &self.api_url)
            .field("pid", &self.pid)
            .field("version", &self.version)
            .field("api_secret", &"[REDACTED]")
            .field("agent_url", &self.agent_url)
            .field("agent_id", &self.agent_id)
            .field("agent_secret", &"[REDACTED]")
            .field("org", &self.org)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Ops chat (Telegram bot) settings
#[derive(Clone)]
pub struct NotifierConfig {
    pub api_base: String,
    pub bot_token: String,
    pub chat_id: String,
    pub timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl NotifierConfig {
    pub fn enabled(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }

    pub fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.bot_token
        )
    }
}

impl fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifierConfig")
            .field("api_base", &self.api_base)
            .field("bot_token", &"[REDACTED]")
            .field("chat_id", &self.chat_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}
