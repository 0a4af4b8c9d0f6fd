//! Response data handlers used by the decode stage.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{FetchError, ResponseError};
use crate::http::{FetchResult, ResponseBody};

/// The library's default decoding, handed to every `DataHandler`.
///
/// Text bodies are parsed as JSON, so an empty body is a parse error; bodies
/// the transport already parsed are passed through.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDecode;

impl DefaultDecode {
    pub fn decode(&self, result: &FetchResult) -> Result<Value, FetchError> {
        match &result.response.body {
            ResponseBody::Parsed(value) => Ok(value.clone()),
            ResponseBody::Text(text) => serde_json::from_str(text).map_err(|e| {
                tracing::debug!(url = %result.request.url, error = %e, "response body is not valid JSON");
                ResponseError::parse(result, e).into()
            }),
        }
    }
}

/// Turns a raw `FetchResult` into the `data` value.
///
/// Implementors may call `decode` to get the default behavior and post-process
/// it, or ignore it entirely.
#[async_trait]
pub trait DataHandler: Send + Sync {
    async fn handle(&self, result: &FetchResult, decode: DefaultDecode) -> Result<Value, FetchError>;
}

#[async_trait]
impl<F> DataHandler for F
where
    F: Fn(&FetchResult, DefaultDecode) -> Result<Value, FetchError> + Send + Sync,
{
    async fn handle(&self, result: &FetchResult, decode: DefaultDecode) -> Result<Value, FetchError> {
        self(result, decode)
    }
}

/// Cloneable handle to a `DataHandler`, stored in options and stage defaults.
#[derive(Clone)]
pub struct SharedDataHandler(Arc<dyn DataHandler>);

impl SharedDataHandler {
    pub fn new(handler: impl DataHandler + 'static) -> Self {
        Self(Arc::new(handler))
    }

    pub async fn handle(&self, result: &FetchResult, decode: DefaultDecode) -> Result<Value, FetchError> {
        self.0.handle(result, decode).await
    }
}

impl fmt::Debug for SharedDataHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedDataHandler")
    }
}
