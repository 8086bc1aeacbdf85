//! Partner Error Types

use thiserror::Error;

pub type PartnerResult<T> = Result<T, PartnerError>;

#[derive(Debug, Error)]
pub enum PartnerError {
    /// Transport failure, including timeouts
    #[error("Partner request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Partner answered with a non-2xx status
    #[error("Partner returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// A field the partner signs was empty
    #[error("Partner request field is empty: {0}")]
    MissingField(&'static str),

    /// Integration not configured
    #[error("Partner integration disabled: {0}")]
    Disabled(&'static str),
}

impl PartnerError {
    /// Partner failures are never surfaced to callers; this is for logging only
    pub fn log(&self, call: &'static str) {
        match self {
            PartnerError::Disabled(_) => {
                tracing::debug!(call, error = %self, "Partner call skipped");
            }
            _ => {
                tracing::warn!(call, error = %self, "Partner call failed");
            }
        }
    }
}
