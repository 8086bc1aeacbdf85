//! Handle Callback Use Case
//!
//! Order of checks: signature present, signature valid, order number present,
//! order known, then the idempotent settlement. Nothing touches storage until
//! the signature has verified.

use std::sync::Arc;

use partner::Notification;
use platform::crypto::ParamSigner;
use platform::queue::JobQueue;
use rust_decimal::Decimal;

use crate::application::config::{GATEWAY_SECRET_FIELD, PaymentConfig};
use crate::domain::callback::CallbackPayload;
use crate::domain::order::SettlementOutcome;
use crate::domain::repository::SettlementRepository;
use crate::error::{PaymentError, PaymentResult};

/// Successful outcome; both variants are acknowledged to the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAck {
    Credited { order_no: String, amount: Decimal },
    AlreadySettled { order_no: String },
}

pub struct HandleCallbackUseCase<R>
where
    R: SettlementRepository,
{
    repo: Arc<R>,
    signer: ParamSigner,
    notifications: Option<JobQueue<Notification>>,
}

impl<R> HandleCallbackUseCase<R>
where
    R: SettlementRepository,
{
    pub fn new(
        repo: Arc<R>,
        config: &PaymentConfig,
        notifications: Option<JobQueue<Notification>>,
    ) -> Self {
        Self {
            repo,
            signer: ParamSigner::new(GATEWAY_SECRET_FIELD, config.merchant_secret.clone()),
            notifications,
        }
    }

    pub async fn execute(&self, payload: CallbackPayload) -> PaymentResult<CallbackAck> {
        let sign = payload.sign().ok_or(PaymentError::MissingSignature)?;

        if !self.signer.verify(payload.signed_params(), sign) {
            tracing::warn!(order_no = ?payload.order_no(), "Callback signature mismatch");
            return Err(PaymentError::SignatureMismatch);
        }

        let order_no = payload
            .order_no()
            .ok_or_else(|| PaymentError::Validation("mchOrderNo is required".to_string()))?;

        let order = self
            .repo
            .find_by_order_no(order_no)
            .await?
            .ok_or(PaymentError::OrderNotFound)?;

        if order.is_settled() {
            tracing::info!(order_no = %order_no, "Callback replay for settled order");
            return Ok(CallbackAck::AlreadySettled {
                order_no: order_no.to_string(),
            });
        }

        match self.repo.settle(order_no, payload.pay_order_id()).await? {
            SettlementOutcome::Settled { phone, amount } => {
                tracing::info!(
                    order_no = %order_no,
                    account_code = order.account_code,
                    amount = %amount,
                    "Order settled"
                );
                self.notify(order_no, payload.pay_order_id().unwrap_or(""), &phone);
                Ok(CallbackAck::Credited {
                    order_no: order_no.to_string(),
                    amount,
                })
            }
            SettlementOutcome::AlreadySettled => {
                tracing::info!(order_no = %order_no, "Order settled by a concurrent callback");
                Ok(CallbackAck::AlreadySettled {
                    order_no: order_no.to_string(),
                })
            }
        }
    }

    fn notify(&self, order_no: &str, pay_order_id: &str, phone: &str) {
        let Some(queue) = &self.notifications else {
            return;
        };
        let text = format!(
            "Order No: {order_no}\nPay Order ID: {pay_order_id}\nUser Phone: {phone}"
        );
        // A full queue is already logged by the queue itself
        let _ = queue.enqueue(Notification::new(text));
    }
}
