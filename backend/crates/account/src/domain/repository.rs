//! Repository Traits
//!
//! Interfaces for account persistence. Implementation is in infrastructure layer.

use platform::password::HashedPassword;

use crate::domain::entity::account::Account;
use crate::domain::value_object::{
    identity_code::IdentityCode,
    phone::{DialCode, PhoneNumber},
    referral_code::ReferralCode,
    tier_level::TierLevel,
};
use crate::error::AccountResult;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Check whether (phone, dial code) is already registered
    async fn exists_by_phone(&self, phone: &PhoneNumber, dial_code: &DialCode)
    -> AccountResult<bool>;

    /// Resolve a referral code to its owner
    async fn find_by_referral_code(&self, code: &ReferralCode) -> AccountResult<Option<Account>>;

    /// Number of accounts created from an origin address
    async fn count_by_origin(&self, origin: &str) -> AccountResult<u64>;

    /// Check whether an identity code is taken
    async fn exists_by_identity_code(&self, code: IdentityCode) -> AccountResult<bool>;

    /// Persist the account with its point-list and turnover rows in one transaction
    ///
    /// Unique violations map to `DuplicatePhone` (phone) or `IdentityTaken`
    /// (identity or referral code).
    async fn create(
        &self,
        account: &Account,
        password: &HashedPassword,
        session_digest: &str,
    ) -> AccountResult<()>;

    /// Recompute the owner's tier from its direct referee count under a row lock
    ///
    /// Returns the stored tier after the update; it never decreases.
    async fn refresh_tier(&self, code: &ReferralCode) -> AccountResult<TierLevel>;

    /// Resolve a session digest to its account
    async fn find_by_session_digest(&self, digest: &str) -> AccountResult<Option<Account>>;
}
