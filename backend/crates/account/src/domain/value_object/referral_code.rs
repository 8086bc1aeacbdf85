//! Referral Code
//!
//! Issued codes are five random digits followed by the owner's identity code.
//! Any non-empty digit string is accepted as input; whether it resolves to an
//! account is a storage question.

use std::fmt;

use platform::crypto::random_digits;

use super::{ValueError, identity_code::IdentityCode};

const PREFIX_DIGITS: usize = 5;
const MAX_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferralCode(String);

impl ReferralCode {
    pub fn new(raw: &str) -> Result<Self, ValueError> {
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.len() > MAX_LEN
            || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ValueError::ReferralCode);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Code handed out to a newly registered account
    pub fn issue_for(identity: IdentityCode) -> Self {
        Self(format!("{}{}", random_digits(PREFIX_DIGITS), identity))
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferralCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
