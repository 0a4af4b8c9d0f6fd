//! Error types for the fetch pipeline.
//!
//! # Design
//! Only two stages create errors of their own: escalation of non-2xx
//! responses and decoding of the response body. Both produce a
//! `ResponseError` that carries the whole request/response context and a
//! machine-readable `ErrorCode`. Transport failures pass through untouched as
//! `TransportError`.

use std::fmt;

use serde_json::Value;
use thiserror::Error;

use crate::http::{FetchResult, RequestRecord, ResponseEnvelope};

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Machine-readable classification of a `ResponseError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Status outside `[200, 300)` with escalation enabled.
    NonOkResponse,
    /// The response body could not be parsed as JSON.
    ParseResponseData,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NonOkResponse => "ERR_NON_OK_RESPONSE",
            ErrorCode::ParseResponseData => "ERR_PARSE_RESPONSE_DATA",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP-level failure with its full triggering context.
#[derive(Debug, Error)]
#[error("{code}: {message}")]
pub struct ResponseError {
    pub code: ErrorCode,
    pub message: String,
    pub request: RequestRecord,
    pub response: ResponseEnvelope,
    pub data: Option<Value>,
    #[source]
    pub cause: Option<BoxError>,
}

impl ResponseError {
    pub(crate) fn non_ok(result: FetchResult) -> Self {
        Self {
            code: ErrorCode::NonOkResponse,
            message: format!("Response status code {}", result.response.status_code),
            request: result.request,
            response: result.response,
            data: result.data,
            cause: None,
        }
    }

    pub(crate) fn parse(result: &FetchResult, cause: serde_json::Error) -> Self {
        Self {
            code: ErrorCode::ParseResponseData,
            message: "Failed to parse response type: json".to_string(),
            request: result.request.clone(),
            response: result.response.clone(),
            data: None,
            cause: Some(Box::new(cause)),
        }
    }
}

/// Failures of the network operation itself.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timeout")]
    Timeout,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

#[cfg(feature = "ureq")]
impl From<ureq::Error> for TransportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Timeout(_) => TransportError::Timeout,
            ureq::Error::Io(io_err) => match io_err.kind() {
                std::io::ErrorKind::TimedOut => TransportError::Timeout,
                std::io::ErrorKind::ConnectionRefused
                | std::io::ErrorKind::ConnectionReset
                | std::io::ErrorKind::ConnectionAborted
                | std::io::ErrorKind::NotConnected => TransportError::Connection(io_err.to_string()),
                _ => TransportError::Io(io_err),
            },
            other @ (ureq::Error::HostNotFound | ureq::Error::ConnectionFailed) => {
                TransportError::Connection(other.to_string())
            }
            other => TransportError::Other(other.to_string()),
        }
    }
}

/// Everything a call to `Client::request` can fail with.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Response(Box<ResponseError>),

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// Raised by a caller-supplied data handler.
    #[error("data handler failed: {0}")]
    Handler(BoxError),
}

impl FetchError {
    /// The code of a `ResponseError`, `None` for any other failure.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            FetchError::Response(err) => Some(err.code),
            _ => None,
        }
    }

    pub fn as_response(&self) -> Option<&ResponseError> {
        match self {
            FetchError::Response(err) => Some(err),
            _ => None,
        }
    }

    pub fn handler(err: impl Into<BoxError>) -> Self {
        FetchError::Handler(err.into())
    }
}

impl From<ResponseError> for FetchError {
    fn from(err: ResponseError) -> Self {
        FetchError::Response(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::options::RequestOptions;

    fn result(status: u16, body: &str) -> FetchResult {
        FetchResult {
            request: RequestRecord::new("https://example.com/a", &RequestOptions::new()),
            response: ResponseEnvelope::text(status, body),
            data: None,
        }
    }

    #[test]
    fn codes_render_their_wire_names() {
        assert_eq!(ErrorCode::NonOkResponse.to_string(), "ERR_NON_OK_RESPONSE");
        assert_eq!(ErrorCode::ParseResponseData.as_str(), "ERR_PARSE_RESPONSE_DATA");
    }

    #[test]
    fn non_ok_error_carries_the_envelope() {
        let err = ResponseError::non_ok(result(404, "missing").with_data(Some(Value::from("missing"))));
        assert_eq!(err.message, "Response status code 404");
        assert_eq!(err.response.status_code, 404);
        assert_eq!(err.request.url, "https://example.com/a");
        assert_eq!(err.data, Some(Value::from("missing")));
        assert!(err.source().is_none());
        assert_eq!(err.to_string(), "ERR_NON_OK_RESPONSE: Response status code 404");
    }

    #[test]
    fn parse_error_keeps_cause_and_clears_data() {
        let cause = serde_json::from_str::<Value>("{oops").unwrap_err();
        let err = ResponseError::parse(&result(200, "{oops"), cause);
        assert_eq!(err.code, ErrorCode::ParseResponseData);
        assert!(err.data.is_none());
        assert!(err.source().is_some());
    }

    #[test]
    fn fetch_error_exposes_code_only_for_response_errors() {
        let err: FetchError = ResponseError::non_ok(result(500, "")).into();
        assert_eq!(err.code(), Some(ErrorCode::NonOkResponse));
        assert_eq!(err.as_response().map(|e| e.response.status_code), Some(500));

        let err: FetchError = TransportError::Timeout.into();
        assert_eq!(err.code(), None);
        assert_eq!(err.to_string(), "transport failed: request timeout");
    }

    #[test]
    fn handler_errors_wrap_arbitrary_failures() {
        let err = FetchError::handler("unexpected envelope");
        assert!(matches!(err, FetchError::Handler(_)));
        assert_eq!(err.to_string(), "data handler failed: unexpected envelope");
    }
}
