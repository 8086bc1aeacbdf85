//! Background Jobs
//!
//! Payloads handed to [`platform::queue::JobQueue`] and the handlers that run
//! them. Handlers log every outcome and never propagate errors.

use chrono::{DateTime, Utc};
use platform::queue::JobHandler;

use crate::client::ProvisioningClient;
use crate::notify::ChatNotifier;

/// Create the shadow accounts for a freshly registered player
#[derive(Debug, Clone)]
pub struct ProvisioningJob {
    /// Account identifier on the agent API (the player's phone number)
    pub account: String,
    /// Display name sent on REGISTER
    pub username: String,
    /// Registration origin address
    pub origin: String,
    /// Registration instant; fixes the key's date window
    pub requested_at: DateTime<Utc>,
}

/// Plain-text ops message
#[derive(Debug, Clone)]
pub struct Notification {
    pub text: String,
}

impl Notification {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl JobHandler<ProvisioningJob> for ProvisioningClient {
    async fn handle(&self, job: ProvisioningJob) {
        match self.register_player(&job.username, &job.origin).await {
            Ok(body) => {
                tracing::info!(username = %job.username, response = %body, "Partner REGISTER done");
            }
            Err(e) => e.log("register"),
        }

        match self.create_member(&job.account, job.requested_at).await {
            Ok(body) => {
                tracing::info!(account = %job.account, response = %body, "Partner CreateMember done");
            }
            Err(e) => e.log("create_member"),
        }
    }
}

impl JobHandler<Notification> for ChatNotifier {
    async fn handle(&self, job: Notification) {
        if let Err(e) = self.send(&job.text).await {
            e.log("notify");
        }
    }
}
