//! Callback Body Extractor
//!
//! The gateway posts either JSON or a urlencoded form depending on channel.
//! Both are flattened into string fields; JSON numbers keep their textual form.

use std::collections::BTreeMap;

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde_json::Value;

use crate::domain::callback::CallbackPayload;
use crate::error::PaymentError;

/// Flat string fields of a callback body
#[derive(Debug, Clone, Default)]
pub struct CallbackFields(pub BTreeMap<String, String>);

impl CallbackFields {
    pub fn into_payload(self) -> CallbackPayload {
        CallbackPayload::from_fields(self.0)
    }
}

impl<S> FromRequest<S> for CallbackFields
where
    S: Send + Sync,
{
    type Rejection = PaymentError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let Json(body) = Json::<BTreeMap<String, Value>>::from_request(req, state)
                .await
                .map_err(|e| PaymentError::Validation(e.body_text()))?;
            Ok(Self(flatten_json(body)))
        } else {
            let Form(body) = Form::<BTreeMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| PaymentError::Validation(e.body_text()))?;
            Ok(Self(body))
        }
    }
}

/// `null` fields are dropped; nested values keep their compact JSON text
fn flatten_json(body: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    body.into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::Null => return None,
                Value::String(s) => s,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect()
}
