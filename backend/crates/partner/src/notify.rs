//! Ops Chat Notifier
//!
//! Posts plain-text messages to a Telegram chat through the bot API.

use std::sync::Arc;

use serde::Serialize;

use crate::config::NotifierConfig;
use crate::error::{PartnerError, PartnerResult};

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Chat notifier; cheap to clone
#[derive(Clone)]
pub struct ChatNotifier {
    http: reqwest::Client,
    config: Arc<NotifierConfig>,
}

impl ChatNotifier {
    pub fn new(config: Arc<NotifierConfig>) -> PartnerResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub async fn send(&self, text: &str) -> PartnerResult<()> {
        if !self.config.enabled() {
            return Err(PartnerError::Disabled("notify"));
        }

        let response = self
            .http
            .post(self.config.send_message_url())
            .json(&SendMessage {
                chat_id: &self.config.chat_id,
                text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PartnerError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}
