//! Settlement Order
//!
//! Created when a deposit is initiated; settled exactly once when the gateway
//! confirms payment. `Pending -> Settled` is the only transition.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum OrderStatus {
    Pending = 0,
    Settled = 1,
}

impl OrderStatus {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    pub fn from_id(id: i16) -> Option<Self> {
        match id {
            0 => Some(Self::Pending),
            1 => Some(Self::Settled),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled)
    }
}

#[derive(Debug, Clone)]
pub struct SettlementOrder {
    /// Merchant order number assigned at deposit time
    pub order_no: String,
    /// Identity code of the account to credit
    pub account_code: i64,
    pub phone: String,
    pub amount: Decimal,
    pub status: OrderStatus,
    /// Gateway-side order id, set on settlement
    pub pay_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

impl SettlementOrder {
    pub fn is_settled(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Result of an attempt to settle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    /// This call won the transition and credited the balance
    Settled { phone: String, amount: Decimal },
    /// Another call settled the order first; nothing changed
    AlreadySettled,
}
