//! Account Router

use axum::{
    Router,
    routing::{get, post},
};
use partner::ProvisioningJob;
use platform::queue::JobQueue;
use std::sync::Arc;

use crate::application::config::AccountConfig;
use crate::domain::repository::AccountRepository;
use crate::infra::postgres::PgAccountRepository;
use crate::presentation::handlers::{self, AccountAppState};

/// Create the Account router with PostgreSQL repository
pub fn account_router(
    repo: PgAccountRepository,
    config: AccountConfig,
    provisioning: Option<JobQueue<ProvisioningJob>>,
) -> Router {
    account_router_generic(repo, config, provisioning)
}

/// Create a generic Account router for any repository implementation
pub fn account_router_generic<R>(
    repo: R,
    config: AccountConfig,
    provisioning: Option<JobQueue<ProvisioningJob>>,
) -> Router
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let state = AccountAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        provisioning,
    };

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/session", get(handlers::session::<R>))
        .with_state(state)
}
