//! Plain-data types exchanged between pipeline stages and the transport.
//!
//! # Design
//! The pipeline never touches the network itself. The innermost stage turns
//! the resolved `RequestOptions` into a `ResolvedRequest`, hands it to a
//! host-supplied `Transport`, and wraps the returned `ResponseEnvelope` into a
//! `FetchResult`. Every stage above it receives and returns owned
//! `FetchResult` values, so no stage ever observes another stage mutating a
//! result in place.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TransportError;
use crate::options::{Body, Extra, Params, PayloadType, RequestOptions};

/// Header map used for requests and responses.
pub type Headers = BTreeMap<String, String>;

/// File upload shape recognized by the transport for `multipart` payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPayload {
    /// Local path of the file to upload.
    pub file_path: String,
    /// Form field name the file is sent under.
    pub name: String,
    /// Additional text fields sent alongside the file.
    #[serde(default)]
    pub form_data: BTreeMap<String, String>,
}

/// A request as handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedRequest {
    Standard {
        method: String,
        headers: Headers,
        body: Option<Body>,
        extra: Extra,
    },
    Upload {
        headers: Headers,
        upload: UploadPayload,
        extra: Extra,
    },
}

impl ResolvedRequest {
    /// Resolve options into a transport request.
    ///
    /// `multipart` payloads become an upload; the body must then hold an
    /// `UploadPayload`-shaped value.
    pub fn from_options(options: &RequestOptions) -> Result<Self, TransportError> {
        if options.payload_type == Some(PayloadType::Multipart) {
            let upload = match &options.body {
                Some(Body::Value(value)) => serde_json::from_value(value.clone())
                    .map_err(|e| TransportError::InvalidRequest(format!("malformed upload: {e}")))?,
                Some(Body::Text(_)) => {
                    return Err(TransportError::InvalidRequest(
                        "multipart body must be an upload object".to_string(),
                    ))
                }
                None => {
                    return Err(TransportError::InvalidRequest(
                        "multipart request without upload body".to_string(),
                    ))
                }
            };
            return Ok(ResolvedRequest::Upload {
                headers: options.headers.clone(),
                upload,
                extra: options.extra.clone(),
            });
        }

        Ok(ResolvedRequest::Standard {
            method: options.method.as_deref().unwrap_or("GET").to_uppercase(),
            headers: options.headers.clone(),
            body: options.body.clone(),
            extra: options.extra.clone(),
        })
    }

    pub fn headers(&self) -> &Headers {
        match self {
            ResolvedRequest::Standard { headers, .. } | ResolvedRequest::Upload { headers, .. } => headers,
        }
    }
}

/// Raw response body, either text or already parsed by the transport.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Text(String),
    Parsed(Value),
}

/// The raw platform response.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: Headers,
    pub body: ResponseBody,
}

impl ResponseEnvelope {
    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            headers: Headers::new(),
            body: ResponseBody::Text(body.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// The request that was actually dispatched. Headers are deliberately absent:
/// they are merged at dispatch time and are not part of the record.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub url: String,
    pub method: String,
    pub params: Params,
    pub payload: Option<Value>,
    pub payload_type: Option<PayloadType>,
    pub body: Option<Body>,
    pub throw_non_ok: Option<bool>,
    pub extra: Extra,
}

impl RequestRecord {
    pub fn new(url: &str, options: &RequestOptions) -> Self {
        Self {
            url: url.to_string(),
            method: options.method.as_deref().unwrap_or("GET").to_uppercase(),
            params: options.params.clone(),
            payload: options.payload.clone(),
            payload_type: options.payload_type,
            body: options.body.clone(),
            throw_non_ok: options.throw_non_ok,
            extra: options.extra.clone(),
        }
    }
}

/// Envelope threaded through every stage on the way out.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    pub request: RequestRecord,
    pub response: ResponseEnvelope,
    /// `None` until a decode stage has run.
    pub data: Option<Value>,
}

impl FetchResult {
    /// Deserialize the decoded `data` into `T`. Missing data reads as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(self.data.as_ref().unwrap_or(&Value::Null))
    }

    pub fn with_data(self, data: Option<Value>) -> Self {
        Self { data, ..self }
    }
}

/// The host-supplied network operation at the bottom of every pipeline.
///
/// Implementations return non-2xx responses as `Ok`; only real transport
/// failures (connection errors, timeouts, unreadable upload files) are `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn perform(&self, url: &str, request: &ResolvedRequest) -> Result<ResponseEnvelope, TransportError>;
}
