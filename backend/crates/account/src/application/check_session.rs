//! Check Session Use Case
//!
//! Resolves a presented credential to its account.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AccountConfig;
use crate::application::session_token;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::error::{AccountError, AccountResult};

/// Check session use case
pub struct CheckSessionUseCase<R>
where
    R: AccountRepository,
{
    repo: Arc<R>,
    config: Arc<AccountConfig>,
}

impl<R> CheckSessionUseCase<R>
where
    R: AccountRepository,
{
    pub fn new(repo: Arc<R>, config: Arc<AccountConfig>) -> Self {
        Self { repo, config }
    }

    pub async fn execute(&self, token: &str) -> AccountResult<Account> {
        self.execute_at(token, Utc::now()).await
    }

    /// The credential must verify, be the one currently stored, and belong to
    /// an active account whose identity matches the signed subject
    pub async fn execute_at(&self, token: &str, now: DateTime<Utc>) -> AccountResult<Account> {
        let claims = session_token::verify(token, &self.config.session_secret, now)?;

        let account = self
            .repo
            .find_by_session_digest(&session_token::digest(token))
            .await?
            .ok_or(AccountError::SessionInvalid)?;

        if account.identity_code.value() != claims.sub || !account.is_active() {
            tracing::warn!(identity_code = %account.identity_code, "Session rejected for account");
            return Err(AccountError::SessionInvalid);
        }

        Ok(account)
    }
}
