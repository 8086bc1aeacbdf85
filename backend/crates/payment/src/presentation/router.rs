//! Payment Router

use axum::{Router, routing::post};
use partner::Notification;
use platform::queue::JobQueue;
use std::sync::Arc;

use crate::application::config::PaymentConfig;
use crate::domain::repository::SettlementRepository;
use crate::infra::postgres::PgSettlementRepository;
use crate::presentation::handlers::{self, PaymentAppState};

/// Create the Payment router with PostgreSQL repository
pub fn payment_router(
    repo: PgSettlementRepository,
    config: PaymentConfig,
    notifications: Option<JobQueue<Notification>>,
) -> Router {
    payment_router_generic(repo, config, notifications)
}

/// Create a generic Payment router for any repository implementation
pub fn payment_router_generic<R>(
    repo: R,
    config: PaymentConfig,
    notifications: Option<JobQueue<Notification>>,
) -> Router
where
    R: SettlementRepository + Clone + Send + Sync + 'static,
{
    let state = PaymentAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        notifications,
    };

    Router::new()
        .route("/callback", post(handlers::callback::<R>))
        .with_state(state)
}
