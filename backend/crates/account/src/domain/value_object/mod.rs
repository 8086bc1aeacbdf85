//! Value Object Module

pub mod account_status;
pub mod identity_code;
pub mod phone;
pub mod referral_code;
pub mod tier_level;

use thiserror::Error;

/// Rejected input for a value object
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("Phone number must be exactly {0} digits")]
    Phone(usize),

    #[error("Dial code must be '+' followed by 1 to 4 digits")]
    DialCode,

    #[error("Referral code must be a non-empty string of digits")]
    ReferralCode,

    #[error("Identity code must be a {0}-digit number")]
    IdentityCode(usize),
}
