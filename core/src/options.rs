//! Per-call request options and their merge rules.
//!
//! Every field is optional. `None` always means "not set here, use whatever
//! the next layer provides"; the three maps treat a missing key the same way.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::handler::SharedDataHandler;
use crate::http::Headers;

/// Query parameters. Array values are sent as repeated keys.
pub type Params = BTreeMap<String, Value>;

/// Transport-specific fields passed through untouched.
pub type Extra = BTreeMap<String, Value>;

/// How the payload stage encodes `payload` into `body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadType {
    Json,
    Form,
    Multipart,
}

/// Encoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Text ready to be written on the wire.
    Text(String),
    /// A structured value left for the transport to interpret.
    Value(Value),
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub params: Params,
    pub headers: Headers,
    pub payload: Option<Value>,
    pub payload_type: Option<PayloadType>,
    pub body: Option<Body>,
    pub throw_non_ok: Option<bool>,
    pub data_handler: Option<SharedDataHandler>,
    pub extra: Extra,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_payload_type(mut self, payload_type: PayloadType) -> Self {
        self.payload_type = Some(payload_type);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_throw_non_ok(mut self, throw_non_ok: bool) -> Self {
        self.throw_non_ok = Some(throw_non_ok);
        self
    }

    pub fn with_data_handler(mut self, handler: SharedDataHandler) -> Self {
        self.data_handler = Some(handler);
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Layer `overrides` on top of `self`.
    ///
    /// Scalar fields take the override when it is set. `params`, `headers`
    /// and `extra` are merged key by key, with the override winning on
    /// collisions.
    pub fn merge(&self, overrides: RequestOptions) -> RequestOptions {
        RequestOptions {
            method: overrides.method.or_else(|| self.method.clone()),
            prefix: overrides.prefix.or_else(|| self.prefix.clone()),
            suffix: overrides.suffix.or_else(|| self.suffix.clone()),
            params: merge_maps(&self.params, overrides.params),
            headers: merge_maps(&self.headers, overrides.headers),
            payload: overrides.payload.or_else(|| self.payload.clone()),
            payload_type: overrides.payload_type.or(self.payload_type),
            body: overrides.body.or_else(|| self.body.clone()),
            throw_non_ok: overrides.throw_non_ok.or(self.throw_non_ok),
            data_handler: overrides.data_handler.or_else(|| self.data_handler.clone()),
            extra: merge_maps(&self.extra, overrides.extra),
        }
    }

    /// Whether the payload stage should encode for this method.
    ///
    /// An unset method counts as a body-carrying one.
    pub(crate) fn carries_payload(&self) -> bool {
        match self.method.as_deref() {
            None => true,
            Some(method) => ["post", "put", "patch", "delete"]
                .iter()
                .any(|m| m.eq_ignore_ascii_case(method)),
        }
    }
}

fn merge_maps<V: Clone>(base: &BTreeMap<String, V>, overrides: BTreeMap<String, V>) -> BTreeMap<String, V> {
    let mut merged = base.clone();
    merged.extend(overrides);
    merged
}

/// Insert `value` under `key`, replacing any existing entry whose name matches
/// case-insensitively.
pub(crate) fn set_header(headers: &mut Headers, key: &str, value: &str) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(key));
    headers.insert(key.to_string(), value.to_string());
}

pub(crate) fn has_header(headers: &Headers, key: &str) -> bool {
    headers.keys().any(|k| k.eq_ignore_ascii_case(key))
}
