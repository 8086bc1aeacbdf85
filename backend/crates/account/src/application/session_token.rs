//! Session Credential
//!
//! Stateless signed token: `base64url(claims JSON) "." base64url(HMAC-SHA256)`.
//! Storage only keeps the SHA-256 digest of the whole token.

use chrono::{DateTime, Utc};
use platform::crypto::{
    constant_time_eq, from_base64_url, hmac_sha256, sha256_hex, to_base64_url,
};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::identity_code::IdentityCode;
use crate::error::{AccountError, AccountResult};

/// Signed payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Identity code of the account
    pub sub: i64,
    /// Expiry, unix seconds
    pub exp: i64,
}

/// Issued credential and the digest persisted for it
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn issue(
        identity: IdentityCode,
        secret: &[u8; 32],
        ttl_secs: i64,
        now: DateTime<Utc>,
    ) -> AccountResult<Self> {
        let expires_at = chrono::Duration::try_seconds(ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AccountError::Internal(format!("Session TTL out of range: {ttl_secs}")))?;
        let claims = SessionClaims {
            sub: identity.value(),
            exp: expires_at.timestamp(),
        };
        let payload = serde_json::to_vec(&claims)
            .map_err(|e| AccountError::Internal(format!("Session claims encoding: {e}")))?;

        let body = to_base64_url(&payload);
        let signature = hmac_sha256(secret, body.as_bytes());
        let token = format!("{}.{}", body, to_base64_url(&signature));

        Ok(Self {
            digest: digest(&token),
            token,
            expires_at,
        })
    }
}

/// Digest stored for a token
pub fn digest(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

/// Check signature and expiry; every failure is `SessionInvalid`
pub fn verify(token: &str, secret: &[u8; 32], now: DateTime<Utc>) -> AccountResult<SessionClaims> {
    let (body, signature) = token.split_once('.').ok_or(AccountError::SessionInvalid)?;
    let signature = from_base64_url(signature).map_err(|_| AccountError::SessionInvalid)?;

    let expected = hmac_sha256(secret, body.as_bytes());
    if !constant_time_eq(&signature, &expected) {
        return Err(AccountError::SessionInvalid);
    }

    let payload = from_base64_url(body).map_err(|_| AccountError::SessionInvalid)?;
    let claims: SessionClaims =
        serde_json::from_slice(&payload).map_err(|_| AccountError::SessionInvalid)?;

    if claims.exp <= now.timestamp() {
        return Err(AccountError::SessionInvalid);
    }
    Ok(claims)
}
