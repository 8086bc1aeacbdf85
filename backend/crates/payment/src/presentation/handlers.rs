//! HTTP Handlers

use axum::extract::State;
use partner::Notification;
use platform::queue::JobQueue;
use std::sync::Arc;

use crate::application::config::PaymentConfig;
use crate::application::HandleCallbackUseCase;
use crate::domain::repository::SettlementRepository;
use crate::error::PaymentResult;
use crate::presentation::extract::CallbackFields;

/// Literal acknowledgement body the gateway expects
pub const ACK_BODY: &str = "success";

/// Shared state for payment handlers
#[derive(Clone)]
pub struct PaymentAppState<R>
where
    R: SettlementRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<PaymentConfig>,
    pub notifications: Option<JobQueue<Notification>>,
}

/// POST /api/payment/callback
pub async fn callback<R>(
    State(state): State<PaymentAppState<R>>,
    fields: CallbackFields,
) -> PaymentResult<&'static str>
where
    R: SettlementRepository + Clone + Send + Sync + 'static,
{
    let use_case = HandleCallbackUseCase::new(
        state.repo.clone(),
        &state.config,
        state.notifications.clone(),
    );

    use_case.execute(fields.into_payload()).await?;

    Ok(ACK_BODY)
}
