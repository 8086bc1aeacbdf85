//! Register Use Case
//!
//! Validates input, enforces uniqueness and origin limits, persists the
//! account, raises the referrer's tier, issues a session credential, and hands
//! partner provisioning to the background queue.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use partner::ProvisioningJob;
use platform::password::ClearTextPassword;
use platform::queue::JobQueue;
use serde::Serialize;

use crate::application::config::AccountConfig;
use crate::application::session_token::SessionToken;
use crate::domain::entity::account::{Account, NewAccount};
use crate::domain::referral::attribution_for;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    identity_code::IdentityCode,
    phone::{DialCode, PhoneNumber},
    referral_code::ReferralCode,
};
use crate::error::{AccountError, AccountResult};

/// Register input
pub struct RegisterInput {
    pub phone: String,
    pub dial_code: String,
    pub password: String,
    pub referral_code: String,
    /// Caller already proved the admin token
    pub privileged: bool,
    pub allowed_tabs: Option<String>,
    /// Client origin key
    pub origin: String,
}

/// What happened to the partner provisioning job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProvisioningStatus {
    Queued,
    Dropped,
    Disabled,
}

/// Register output
pub struct RegisterOutput {
    pub account: Account,
    pub session: SessionToken,
    pub provisioning: ProvisioningStatus,
}

/// Register use case
pub struct RegisterUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AccountConfig>,
    provisioning: Option<JobQueue<ProvisioningJob>>,
}

impl<R> RegisterUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(
        repo: Arc<R>,
        config: Arc<AccountConfig>,
        provisioning: Option<JobQueue<ProvisioningJob>>,
    ) -> Self {
        Self {
            repo,
            config,
            provisioning,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AccountResult<RegisterOutput> {
        self.execute_at(input, Utc::now()).await
    }

    pub async fn execute_at(
        &self,
        input: RegisterInput,
        now: DateTime<Utc>,
    ) -> AccountResult<RegisterOutput> {
        // Validate everything before touching storage
        let phone = PhoneNumber::new(&input.phone)?;
        let dial_code = DialCode::new(&input.dial_code)?;
        let password = ClearTextPassword::new(input.password)?;
        let referral_code = ReferralCode::new(&input.referral_code)?;

        if self.repo.exists_by_phone(&phone, &dial_code).await? {
            return Err(AccountError::DuplicatePhone);
        }

        let referrer = self
            .repo
            .find_by_referral_code(&referral_code)
            .await?
            .ok_or(AccountError::InvalidReferrer)?;

        if !input.privileged {
            let owned = self.repo.count_by_origin(&input.origin).await?;
            if owned > self.config.max_accounts_per_origin {
                tracing::warn!(origin = %input.origin, owned, "Origin account limit reached");
                return Err(AccountError::TooManyAccountsFromOrigin);
            }
        }

        let password_hash = password.hash(&self.config.password_params)?;
        let attribution = attribution_for(&referrer);

        let mut attempts = 0;
        let (account, session) = loop {
            if attempts >= self.config.identity_attempts {
                return Err(AccountError::IdentityExhausted);
            }
            attempts += 1;

            let identity_code = IdentityCode::generate();
            if self.repo.exists_by_identity_code(identity_code).await? {
                continue;
            }

            let account = Account::new(
                NewAccount {
                    identity_code,
                    phone: phone.clone(),
                    dial_code: dial_code.clone(),
                    invited_by: referral_code.clone(),
                    attribution: attribution.clone(),
                    signup_bonus: self.config.signup_bonus,
                    privileged: input.privileged,
                    allowed_tabs: input.allowed_tabs.clone().filter(|_| input.privileged),
                    origin: input.origin.clone(),
                },
                now,
            );
            let session = SessionToken::issue(
                identity_code,
                &self.config.session_secret,
                self.config.session_ttl_secs(),
                now,
            )?;

            match self
                .repo
                .create(&account, &password_hash, &session.digest)
                .await
            {
                Ok(()) => break (account, session),
                Err(AccountError::IdentityTaken) => {
                    tracing::debug!(attempt = attempts, "Identity code collided on insert");
                    continue;
                }
                Err(e) => return Err(e),
            }
        };

        // The account is committed; a failed recompute is caught up by the next referee
        match self.repo.refresh_tier(&referral_code).await {
            Ok(tier) => {
                tracing::debug!(referrer = %referrer.identity_code, tier = %tier, "Referrer tier refreshed");
            }
            Err(e) => {
                tracing::error!(referrer = %referrer.identity_code, error = %e, "Referrer tier refresh failed");
            }
        }

        let provisioning = self.dispatch_provisioning(&account, now);

        tracing::info!(
            identity_code = %account.identity_code,
            dial_code = %account.dial_code,
            referrer = %referrer.identity_code,
            privileged = account.privileged,
            provisioning = ?provisioning,
            "Account registered"
        );

        Ok(RegisterOutput {
            account,
            session,
            provisioning,
        })
    }

    fn dispatch_provisioning(&self, account: &Account, now: DateTime<Utc>) -> ProvisioningStatus {
        let Some(queue) = &self.provisioning else {
            return ProvisioningStatus::Disabled;
        };

        let job = ProvisioningJob {
            account: account.phone.as_str().to_string(),
            username: account.display_name.clone(),
            origin: account.origin.clone(),
            requested_at: now,
        };
        match queue.enqueue(job) {
            Ok(()) => ProvisioningStatus::Queued,
            Err(_) => ProvisioningStatus::Dropped,
        }
    }
}
