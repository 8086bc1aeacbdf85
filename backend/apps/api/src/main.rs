//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors; request errors are rendered by each
//! crate's error type.

mod config;

use account::{PgAccountRepository, account_router};
use axum::{
    Router, http,
    http::{Method, header},
};
use partner::{ChatNotifier, Notification, ProvisioningClient, ProvisioningJob};
use payment::{PgSettlementRepository, payment_router};
use platform::queue::JobQueue;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,account=info,payment=info,partner=info,platform=info,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Background queues for partner side effects
    let provisioning: Option<JobQueue<ProvisioningJob>> =
        if config.partner.register_enabled() || config.partner.create_member_enabled() {
            let client = ProvisioningClient::new(Arc::new(config.partner.clone()))?;
            Some(JobQueue::start("provisioning", config.queue, client))
        } else {
            tracing::warn!("Partner provisioning is not configured, registrations will not be provisioned");
            None
        };

    let notifications: Option<JobQueue<Notification>> = if config.notifier.enabled() {
        let notifier = ChatNotifier::new(Arc::new(config.notifier.clone()))?;
        Some(JobQueue::start("notifications", config.queue, notifier))
    } else {
        tracing::warn!("Ops notifier is not configured, settlements will not be announced");
        None
    };

    // CORS configuration
    let allowed_origins: Vec<http::HeaderValue> = config
        .frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::HeaderName::from_static("x-admin-token"),
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest(
            "/api/account",
            account_router(
                PgAccountRepository::new(pool.clone()),
                config.account.clone(),
                provisioning,
            ),
        )
        .nest(
            "/api/payment",
            payment_router(
                PgSettlementRepository::new(pool.clone()),
                config.payment.clone(),
                notifications,
            ),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = config.bind_addr;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
