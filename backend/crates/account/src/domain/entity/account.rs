//! Account Entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::value_object::{
    account_status::AccountStatus,
    identity_code::IdentityCode,
    phone::{DialCode, PhoneNumber},
    referral_code::ReferralCode,
    tier_level::TierLevel,
};

/// Registered member
///
/// The password hash and the session digest live only in storage and are not
/// part of the entity.
#[derive(Debug, Clone)]
pub struct Account {
    pub identity_code: IdentityCode,
    pub phone: PhoneNumber,
    pub dial_code: DialCode,
    pub display_name: String,
    /// Code other accounts register with
    pub referral_code: ReferralCode,
    /// Referral code this account registered with
    pub invited_by: ReferralCode,
    /// Phone of the upline that owns this account's attribution
    pub attribution: Option<String>,
    pub tier_level: TierLevel,
    pub balance: Decimal,
    pub bonus_balance: Decimal,
    pub total_deposit: Decimal,
    pub status: AccountStatus,
    pub privileged: bool,
    pub allowed_tabs: Option<String>,
    /// Client address the account was created from
    pub origin: String,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to create an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub identity_code: IdentityCode,
    pub phone: PhoneNumber,
    pub dial_code: DialCode,
    pub invited_by: ReferralCode,
    pub attribution: Option<String>,
    pub signup_bonus: Decimal,
    pub privileged: bool,
    pub allowed_tabs: Option<String>,
    pub origin: String,
}

impl Account {
    /// Build a fresh account with zero balances and tier
    pub fn new(input: NewAccount, now: DateTime<Utc>) -> Self {
        let display_name = if input.privileged {
            "Admin".to_string()
        } else {
            format!("Member{}", platform::crypto::random_digits(5))
        };

        Self {
            referral_code: ReferralCode::issue_for(input.identity_code),
            identity_code: input.identity_code,
            phone: input.phone,
            dial_code: input.dial_code,
            display_name,
            invited_by: input.invited_by,
            attribution: input.attribution,
            tier_level: TierLevel::default(),
            balance: Decimal::ZERO,
            bonus_balance: input.signup_bonus,
            total_deposit: Decimal::ZERO,
            status: AccountStatus::default(),
            privileged: input.privileged,
            allowed_tabs: input.allowed_tabs,
            origin: input.origin,
            created_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
