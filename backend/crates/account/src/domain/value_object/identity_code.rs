//! Identity Code
//!
//! Fixed-width numeric account identifier. Uniqueness is enforced by storage;
//! generation only guarantees the format.

use std::fmt;

use platform::crypto::random_digits;

use super::ValueError;

pub const IDENTITY_DIGITS: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityCode(i64);

impl IdentityCode {
    const MIN: i64 = 1_000_000;
    const MAX: i64 = 9_999_999;

    /// Random candidate; the first digit is never `0`
    pub fn generate() -> Self {
        loop {
            let digits = random_digits(IDENTITY_DIGITS);
            if let Ok(code) = Self::parse(&digits) {
                return code;
            }
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        raw.parse::<i64>()
            .ok()
            .and_then(Self::from_i64)
            .ok_or(ValueError::IdentityCode(IDENTITY_DIGITS))
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for IdentityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
