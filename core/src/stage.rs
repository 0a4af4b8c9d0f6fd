//! The single shape every pipeline layer shares.
//!
//! # Design
//! A `Stage` takes a URL and owned options and produces a `FetchResult`.
//! Wrapping stages hold an `Arc<dyn Stage>` to the stage they decorate and
//! never mutate it, so one inner pipeline can be shared by any number of
//! differently configured clients.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::http::{FetchResult, RequestRecord, ResolvedRequest, Transport};
use crate::options::RequestOptions;

pub type SharedStage = Arc<dyn Stage>;

#[async_trait]
pub trait Stage: Send + Sync {
    async fn invoke(&self, url: String, options: RequestOptions) -> Result<FetchResult, FetchError>;
}

/// Adapts an async closure into a `Stage`.
pub struct FnStage<F>(pub F);

#[async_trait]
impl<F, Fut> Stage for FnStage<F>
where
    F: Fn(String, RequestOptions) -> Fut + Send + Sync,
    Fut: Future<Output = Result<FetchResult, FetchError>> + Send + 'static,
{
    async fn invoke(&self, url: String, options: RequestOptions) -> Result<FetchResult, FetchError> {
        (self.0)(url, options).await
    }
}

/// Innermost stage: resolves the options, calls the transport and wraps the
/// raw response. `data` is left unset.
pub struct TransportStage<T> {
    transport: T,
}

impl<T: Transport> TransportStage<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: Transport> Stage for TransportStage<T> {
    async fn invoke(&self, url: String, options: RequestOptions) -> Result<FetchResult, FetchError> {
        let resolved = ResolvedRequest::from_options(&options)?;
        let record = RequestRecord::new(&url, &options);

        tracing::debug!(method = %record.method, url = %url, "dispatching request");
        let response = self.transport.perform(&url, &resolved).await?;
        tracing::debug!(status = response.status_code, url = %url, "response received");

        Ok(FetchResult {
            request: record,
            response,
            data: None,
        })
    }
}
