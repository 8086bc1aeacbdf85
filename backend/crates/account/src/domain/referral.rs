//! Referral Rules
//!
//! Attribution is flattened: a new account is attributed to its referrer only
//! when the referrer has reached [`ATTRIBUTION_TIER`]; otherwise it inherits
//! whatever attribution the referrer itself carries.

use crate::domain::entity::account::Account;
use crate::domain::value_object::tier_level::ATTRIBUTION_TIER;

/// Attribution for an account registering with `referrer`'s code
pub fn attribution_for(referrer: &Account) -> Option<String> {
    if referrer.tier_level >= ATTRIBUTION_TIER {
        Some(referrer.phone.as_str().to_string())
    } else {
        referrer.attribution.clone()
    }
}
