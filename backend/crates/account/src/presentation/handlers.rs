//! HTTP Handlers

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode, header};
use partner::ProvisioningJob;
use platform::client::{extract_client_ip, origin_key};
use platform::crypto::constant_time_eq;
use platform::queue::JobQueue;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::application::config::AccountConfig;
use crate::application::{CheckSessionUseCase, RegisterInput, RegisterUseCase};
use crate::domain::repository::AccountRepository;
use crate::error::{AccountError, AccountResult};
use crate::presentation::dto::{RegisterRequest, RegisterResponse, SessionResponse};

/// Header carrying the admin token for privileged registration
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Shared state for account handlers
#[derive(Clone)]
pub struct AccountAppState<R>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AccountConfig>,
    pub provisioning: Option<JobQueue<ProvisioningJob>>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/account/register
pub async fn register<R>(
    State(state): State<AccountAppState<R>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<RegisterRequest>,
) -> AccountResult<(StatusCode, Json<RegisterResponse>)>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let privileged = req.allowed_tabs.is_some();
    if privileged && !admin_token_matches(&headers, &state.config) {
        return Err(AccountError::PrivilegeDenied);
    }

    let client_ip = extract_client_ip(&headers, addr.ip(), &state.config.trusted_proxies);

    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.config.clone(),
        state.provisioning.clone(),
    );

    let input = RegisterInput {
        phone: req.phone_number,
        dial_code: req.dial_code,
        password: req.pwd,
        referral_code: req.invite_code,
        privileged,
        allowed_tabs: req.allowed_tabs,
        origin: origin_key(client_ip),
    };

    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::OK,
        Json(RegisterResponse {
            status: true,
            message: "Registered successfully",
            token: output.session.token,
            value: output.session.digest,
            identity_code: output.account.identity_code.value(),
            referral_code: output.account.referral_code.as_str().to_string(),
            provisioning: output.provisioning,
        }),
    ))
}

fn admin_token_matches(headers: &HeaderMap, config: &AccountConfig) -> bool {
    let Some(expected) = config.admin_registration_token.as_deref() else {
        return false;
    };
    headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|provided| constant_time_eq(provided.as_bytes(), expected.as_bytes()))
}

// ============================================================================
// Session
// ============================================================================

/// GET /api/account/session
pub async fn session<R>(
    State(state): State<AccountAppState<R>>,
    headers: HeaderMap,
) -> AccountResult<Json<SessionResponse>>
where
    R: AccountRepository + Clone + Send + Sync + 'static,
{
    let token = extract_bearer(&headers).ok_or(AccountError::SessionInvalid)?;

    let use_case = CheckSessionUseCase::new(state.repo.clone(), state.config.clone());
    let account = use_case.execute(token).await?;

    Ok(Json(account.into()))
}

/// Extract the credential from `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
