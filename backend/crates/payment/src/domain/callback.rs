//! Settlement Callback Payload
//!
//! The gateway posts a flat field set. Only the declared fields take part in
//! the signature; anything else in the body is ignored.

use std::collections::BTreeMap;

use platform::crypto::SIGN_FIELD;

/// Fields covered by the gateway signature
pub const SIGNED_FIELDS: [&str; 13] = [
    "mchOrderNo",
    "income",
    "mchId",
    "appId",
    "productId",
    "payOrderId",
    "amount",
    "status",
    "channelOrderNo",
    "param1",
    "param2",
    "paySuccTime",
    "backType",
];

/// Parsed callback body
#[derive(Debug, Clone, Default)]
pub struct CallbackPayload {
    /// Declared fields that were present and non-empty
    signed: BTreeMap<String, String>,
    sign: Option<String>,
}

impl CallbackPayload {
    /// Keep the declared fields and the signature; drop everything else
    pub fn from_fields(mut fields: BTreeMap<String, String>) -> Self {
        let sign = fields.remove(SIGN_FIELD).filter(|s| !s.is_empty());
        let signed = SIGNED_FIELDS
            .iter()
            .filter_map(|&name| {
                fields
                    .remove(name)
                    .filter(|v| !v.is_empty())
                    .map(|v| (name.to_string(), v))
            })
            .collect();

        Self { signed, sign }
    }

    /// Parameters the signature is computed over
    pub fn signed_params(&self) -> &BTreeMap<String, String> {
        &self.signed
    }

    pub fn sign(&self) -> Option<&str> {
        self.sign.as_deref()
    }

    pub fn order_no(&self) -> Option<&str> {
        self.field("mchOrderNo")
    }

    pub fn pay_order_id(&self) -> Option<&str> {
        self.field("payOrderId")
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.signed.get(name).map(String::as_str)
    }
}
