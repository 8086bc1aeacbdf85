//! Game-Platform Provisioning Client
//!
//! Two calls create the player's shadow account:
//! - REGISTER: JSON body signed with the merchant API secret (`apikey`)
//! - CreateMember: form body authenticated only by the derived key

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::crypto::{ParamSigner, SIGN_FIELD};

use crate::config::PartnerConfig;
use crate::error::{PartnerError, PartnerResult};
use crate::key::derive_key;

/// Secret field name appended when signing REGISTER
const REGISTER_SECRET_FIELD: &str = "apikey";

/// Provisioning client; cheap to clone
#[derive(Clone)]
pub struct ProvisioningClient {
    http: reqwest::Client,
    config: Arc<PartnerConfig>,
    signer: ParamSigner,
}

impl ProvisioningClient {
    /// Build a client whose every request is bounded by `config.timeout`
    pub fn new(config: Arc<PartnerConfig>) -> PartnerResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        let signer = ParamSigner::new(REGISTER_SECRET_FIELD, config.api_secret.clone());

        Ok(Self {
            http,
            config,
            signer,
        })
    }

    /// Signed REGISTER parameters, `sign` included
    ///
    /// The partner signs every field, empty ones included, while
    /// [`ParamSigner`] skips empty values. The two agree only while every
    /// field is non-empty, which `register_enabled` and `register_player`
    /// guarantee.
    pub fn register_params(&self, username: &str, ip: &str) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("pid".to_string(), self.config.pid.clone());
        params.insert("ver".to_string(), self.config.version.clone());
        params.insert("method".to_string(), "REGISTER".to_string());
        params.insert("username".to_string(), username.to_string());
        params.insert("org".to_string(), self.config.org.to_string());
        params.insert("ip".to_string(), ip.to_string());

        let sign = self.signer.sign(&params);
        params.insert(SIGN_FIELD.to_string(), sign);
        params
    }

    /// CreateMember form fields for `account` at instant `at`
    pub fn create_member_form(&self, account: &str, at: DateTime<Utc>) -> [(&'static str, String); 3] {
        let key = derive_key(
            account,
            &self.config.agent_id,
            &self.config.agent_secret,
            at,
            &self.config.key_framing,
        );

        [
            ("Account", account.to_string()),
            ("AgentId", self.config.agent_id.clone()),
            ("Key", key),
        ]
    }

    /// POST the signed REGISTER call
    pub async fn register_player(&self, username: &str, ip: &str) -> PartnerResult<String> {
        if !self.config.register_enabled() {
            return Err(PartnerError::Disabled("register"));
        }
        if username.is_empty() {
            return Err(PartnerError::MissingField("username"));
        }
        if ip.is_empty() {
            return Err(PartnerError::MissingField("ip"));
        }

        let params = self.register_params(username, ip);
        let response = self
            .http
            .post(&self.config.api_url)
            .json(&params)
            .send()
            .await?;

        Self::read_body(response).await
    }

    /// POST CreateMember with a key derived for `at`
    pub async fn create_member(&self, account: &str, at: DateTime<Utc>) -> PartnerResult<String> {
        if !self.config.create_member_enabled() {
            return Err(PartnerError::Disabled("create_member"));
        }

        let form = self.create_member_form(account, at);
        let response = self
            .http
            .post(self.config.create_member_url())
            .form(&form)
            .send()
            .await?;

        Self::read_body(response).await
    }

    async fn read_body(response: reqwest::Response) -> PartnerResult<String> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(PartnerError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
