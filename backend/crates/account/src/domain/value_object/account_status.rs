//! Account Status

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum AccountStatus {
    /// Normal account
    #[default]
    Active = 1,

    /// Locked by an operator; sessions stop resolving
    Locked = 0,
}

impl AccountStatus {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Locked => "locked",
        }
    }

    #[inline]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Unknown ids are treated as locked
    pub fn from_id(id: i16) -> Self {
        match id {
            1 => Self::Active,
            _ => Self::Locked,
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
