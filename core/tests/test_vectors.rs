//! Verify the standard stack against JSON test vectors stored in `test-vectors/`.
//!
//! Each case names a `ClientConfig`, a call, and either the request the
//! transport should receive or the outcome of decoding a simulated response.
//! Requests are captured by a recording transport, so no network is involved.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fetch_core::{
    Body, Client, ClientConfig, PayloadType, RequestOptions, ResolvedRequest, ResponseEnvelope, Transport,
    TransportError,
};
use serde_json::Value;

/// Replies with a fixed response and keeps the last request it was handed.
#[derive(Clone)]
struct Recorder {
    response: ResponseEnvelope,
    last: Arc<Mutex<Option<(String, ResolvedRequest)>>>,
}

impl Recorder {
    fn new(status: u16, body: &str) -> Self {
        Self {
            response: ResponseEnvelope::text(status, body),
            last: Arc::default(),
        }
    }

    fn take(&self) -> (String, ResolvedRequest) {
        self.last.lock().unwrap().take().expect("transport was not called")
    }
}

#[async_trait]
impl Transport for Recorder {
    async fn perform(&self, url: &str, request: &ResolvedRequest) -> Result<ResponseEnvelope, TransportError> {
        *self.last.lock().unwrap() = Some((url.to_string(), request.clone()));
        Ok(self.response.clone())
    }
}

/// Build per-call options from the `call` object of a vector.
fn call_options(call: &Value) -> RequestOptions {
    let mut options = RequestOptions::new();
    if let Some(method) = call["method"].as_str() {
        options = options.with_method(method);
    }
    if let Some(prefix) = call["prefix"].as_str() {
        options = options.with_prefix(prefix);
    }
    if let Some(suffix) = call["suffix"].as_str() {
        options = options.with_suffix(suffix);
    }
    if let Some(params) = call["params"].as_object() {
        for (key, value) in params {
            options = options.with_param(key.as_str(), value.clone());
        }
    }
    if let Some(headers) = call["headers"].as_object() {
        for (key, value) in headers {
            options = options.with_header(key.as_str(), value.as_str().unwrap());
        }
    }
    if let Some(payload) = call.get("payload") {
        options = options.with_payload(payload.clone());
    }
    if let Some(payload_type) = call.get("payloadType") {
        let payload_type: PayloadType = serde_json::from_value(payload_type.clone()).unwrap();
        options = options.with_payload_type(payload_type);
    }
    if let Some(body) = call["body"].as_str() {
        options = options.with_body(Body::Text(body.to_string()));
    }
    options
}

fn config(case: &Value) -> ClientConfig {
    serde_json::from_value(case["config"].clone()).unwrap()
}

async fn run_request_vectors(raw: &str) {
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let transport = Recorder::new(200, "{}");
        let client = Client::standard(transport.clone(), &config(case));

        client
            .request(case["url"].as_str().unwrap(), call_options(&case["call"]))
            .await
            .unwrap_or_else(|e| panic!("{name}: request failed: {e}"));

        let expected = &case["expected_request"];
        let (url, request) = transport.take();
        assert_eq!(url, expected["url"].as_str().unwrap(), "{name}: url");

        let ResolvedRequest::Standard {
            method, headers, body, ..
        } = request
        else {
            panic!("{name}: expected a standard request");
        };
        assert_eq!(method, expected["method"].as_str().unwrap(), "{name}: method");

        let expected_headers: Value = expected["headers"].clone();
        assert_eq!(serde_json::to_value(&headers).unwrap(), expected_headers, "{name}: headers");

        let body = body.map(|b| match b {
            Body::Text(text) => text,
            Body::Value(value) => value.to_string(),
        });
        assert_eq!(body.as_deref(), expected["body"].as_str(), "{name}: body");
    }
}

// ---------------------------------------------------------------------------
// Request shaping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn affix_test_vectors() {
    run_request_vectors(include_str!("../../test-vectors/affix.json")).await;
}

#[tokio::test]
async fn params_test_vectors() {
    run_request_vectors(include_str!("../../test-vectors/params.json")).await;
}

#[tokio::test]
async fn payload_test_vectors() {
    run_request_vectors(include_str!("../../test-vectors/payload.json")).await;
}

// ---------------------------------------------------------------------------
// Response handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/response.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["response"];
        let transport = Recorder::new(sim["status"].as_u64().unwrap() as u16, sim["body"].as_str().unwrap());
        let client = Client::standard(transport, &config(case));

        let result = client.request("/r", RequestOptions::new()).await;

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.expect_err(name);
            let response_error = err.as_response().unwrap_or_else(|| panic!("{name}: not a response error"));
            assert_eq!(response_error.code.as_str(), expected_error["code"].as_str().unwrap(), "{name}: code");
            assert_eq!(response_error.message, expected_error["message"].as_str().unwrap(), "{name}: message");
            assert_eq!(response_error.response.status_code as u64, sim["status"].as_u64().unwrap(), "{name}: status");
            if let Some(data) = expected_error.get("data") {
                let data = if data.is_null() && expected_error["code"] == "ERR_PARSE_RESPONSE_DATA" {
                    None
                } else {
                    Some(data.clone())
                };
                assert_eq!(response_error.data, data, "{name}: data");
            }
        } else {
            let result = result.unwrap_or_else(|e| panic!("{name}: unexpected error: {e}"));
            assert_eq!(result.data.as_ref(), Some(&case["expected_data"]), "{name}: data");
        }
    }
}
