//! Phone Number and Dial Code
//!
//! A phone number is unique per dial code. Both are stored as given after
//! trimming; no reformatting happens.

use std::fmt;

use super::ValueError;

/// National phone number length
pub const PHONE_DIGITS: usize = 10;

/// 10-digit national phone number
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: &str) -> Result<Self, ValueError> {
        let trimmed = raw.trim();
        if trimmed.len() != PHONE_DIGITS || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValueError::Phone(PHONE_DIGITS));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Restore from database without validation
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// International dial code, e.g. `+91`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DialCode(String);

impl DialCode {
    pub fn new(raw: &str) -> Result<Self, ValueError> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('+').ok_or(ValueError::DialCode)?;
        if digits.is_empty() || digits.len() > 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValueError::DialCode);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
