//! API DTOs (Data Transfer Objects)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::register::ProvisioningStatus;
use crate::domain::entity::account::Account;

// ============================================================================
// Register
// ============================================================================

/// Register request; field names follow the mobile client
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub phone_number: String,
    pub pwd: String,
    #[serde(rename = "invitecode")]
    pub invite_code: String,
    pub dial_code: String,
    /// Present only for privileged registration
    pub allowed_tabs: Option<String>,
}

/// Register response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub status: bool,
    pub message: &'static str,
    /// Session credential
    pub token: String,
    /// Stored digest of `token`
    pub value: String,
    pub identity_code: i64,
    pub referral_code: String,
    pub provisioning: ProvisioningStatus,
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub identity_code: i64,
    pub phone: String,
    pub dial_code: String,
    pub display_name: String,
    pub referral_code: String,
    pub tier_level: i16,
    pub balance: Decimal,
    pub bonus_balance: Decimal,
    pub total_deposit: Decimal,
    pub status: &'static str,
}

impl From<Account> for SessionResponse {
    fn from(account: Account) -> Self {
        Self {
            identity_code: account.identity_code.value(),
            phone: account.phone.as_str().to_string(),
            dial_code: account.dial_code.as_str().to_string(),
            display_name: account.display_name,
            referral_code: account.referral_code.as_str().to_string(),
            tier_level: account.tier_level.value(),
            balance: account.balance,
            bonus_balance: account.bonus_balance,
            total_deposit: account.total_deposit,
            status: account.status.code(),
        }
    }
}
