//! Repository Traits

use crate::domain::order::{SettlementOrder, SettlementOutcome};
use crate::error::PaymentResult;

/// Settlement order repository trait
#[trait_variant::make(SettlementRepository: Send)]
pub trait LocalSettlementRepository {
    /// Find an order by merchant order number
    async fn find_by_order_no(&self, order_no: &str) -> PaymentResult<Option<SettlementOrder>>;

    /// Move a pending order to settled and credit its account, atomically
    ///
    /// Only the caller that flips the status credits; a lost race returns
    /// `AlreadySettled`.
    async fn settle(
        &self,
        order_no: &str,
        pay_order_id: Option<&str>,
    ) -> PaymentResult<SettlementOutcome>;
}
