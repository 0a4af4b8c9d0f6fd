//! Reference `Transport` backed by a blocking `ureq` agent.
//!
//! Requests run on tokio's blocking pool. Status codes are never turned into
//! errors here; that is the escalation stage's job.
//!
//! Of the `extra` fields only `timeout` (milliseconds) is read; it overrides
//! the agent's global timeout for that one request. Other keys are ignored.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::error::TransportError;
use crate::http::{Headers, ResolvedRequest, ResponseBody, ResponseEnvelope, Transport, UploadPayload};
use crate::options::{set_header, Body, Extra};

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl UreqTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn perform(&self, url: &str, request: &ResolvedRequest) -> Result<ResponseEnvelope, TransportError> {
        let agent = self.agent.clone();
        let url = url.to_string();
        let request = request.clone();

        tokio::task::spawn_blocking(move || execute(&agent, &url, request))
            .await
            .map_err(|e| TransportError::Other(format!("transport task failed: {e}")))?
    }
}

fn execute(agent: &ureq::Agent, url: &str, request: ResolvedRequest) -> Result<ResponseEnvelope, TransportError> {
    let (method, headers, body, timeout) = match request {
        ResolvedRequest::Standard {
            method,
            headers,
            body,
            extra,
        } => (method, headers, body.map(body_bytes), request_timeout(&extra)),
        ResolvedRequest::Upload {
            mut headers,
            upload,
            extra,
        } => {
            let boundary = format!("----fetch-core-{}", Uuid::new_v4().simple());
            let body = multipart_body(&upload, &boundary)?;
            set_header(&mut headers, "content-type", &format!("multipart/form-data; boundary={boundary}"));
            ("POST".to_string(), headers, Some(body), request_timeout(&extra))
        }
    };

    let mut response = match (method.as_str(), body) {
        ("GET", _) => prepare(agent.get(url), &headers, timeout).call()?,
        ("HEAD", _) => prepare(agent.head(url), &headers, timeout).call()?,
        ("DELETE", None) => prepare(agent.delete(url), &headers, timeout).call()?,
        ("DELETE", Some(bytes)) => prepare(agent.delete(url), &headers, timeout)
            .force_send_body()
            .send(&bytes[..])?,
        ("POST", Some(bytes)) => prepare(agent.post(url), &headers, timeout).send(&bytes[..])?,
        ("POST", None) => prepare(agent.post(url), &headers, timeout).send_empty()?,
        ("PUT", Some(bytes)) => prepare(agent.put(url), &headers, timeout).send(&bytes[..])?,
        ("PUT", None) => prepare(agent.put(url), &headers, timeout).send_empty()?,
        ("PATCH", Some(bytes)) => prepare(agent.patch(url), &headers, timeout).send(&bytes[..])?,
        ("PATCH", None) => prepare(agent.patch(url), &headers, timeout).send_empty()?,
        (other, _) => return Err(TransportError::InvalidRequest(format!("unsupported method {other}"))),
    };

    let status_code = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| Some((name.as_str().to_lowercase(), value.to_str().ok()?.to_string())))
        .collect();
    let text = response.body_mut().read_to_string()?;

    Ok(ResponseEnvelope {
        status_code,
        headers,
        body: ResponseBody::Text(text),
    })
}

fn prepare<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &Headers,
    timeout: Option<Duration>,
) -> ureq::RequestBuilder<B> {
    for (key, value) in headers {
        builder = builder.header(key.as_str(), value.as_str());
    }
    match timeout {
        Some(timeout) => builder.config().timeout_global(Some(timeout)).build(),
        None => builder,
    }
}

/// Per-request timeout from `extra.timeout`, in milliseconds.
fn request_timeout(extra: &Extra) -> Option<Duration> {
    extra.get("timeout").and_then(Value::as_u64).map(Duration::from_millis)
}

fn body_bytes(body: Body) -> Vec<u8> {
    match body {
        Body::Text(text) => text.into_bytes(),
        Body::Value(Value::String(text)) => text.into_bytes(),
        Body::Value(value) => value.to_string().into_bytes(),
    }
}

/// Encode an upload as `multipart/form-data`: text fields first, then the file.
pub(crate) fn multipart_body(upload: &UploadPayload, boundary: &str) -> Result<Vec<u8>, TransportError> {
    let contents = std::fs::read(&upload.file_path)?;
    let file_name = Path::new(&upload.file_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");

    let mut body = Vec::with_capacity(contents.len() + 256);
    for (name, value) in &upload.form_data {
        body.extend_from_slice(
            format!("--{boundary}\r\ncontent-disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n").as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{boundary}\r\ncontent-disposition: form-data; name=\"{}\"; filename=\"{file_name}\"\r\ncontent-type: application/octet-stream\r\n\r\n",
            upload.name
        )
        .as_bytes(),
    );
    body.extend_from_slice(&contents);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    Ok(body)
}
