//! Composable HTTP client built from wrapping stages.
//!
//! # Design
//! `Client` holds only the outermost stage of its pipeline. Every `with*`
//! method returns a new `Client` whose stage wraps the current one; the
//! receiver is left untouched and stays usable. Stages capture immutable
//! configuration only, so one client can serve any number of concurrent
//! calls.
//!
//! The last stage added is the first to see a call:
//!
//! ```text
//! Client::new(transport).with_data_handler(None).with_throw_non_ok(true).with_affix(..)
//!
//! request -> affix -> throw_non_ok -> data_handler -> transport
//! result  <- affix <- throw_non_ok <- data_handler <- transport
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::FetchError;
use crate::handler::SharedDataHandler;
use crate::http::{FetchResult, Transport};
use crate::options::{has_header, Params, PayloadType, RequestOptions};
use crate::stage::{FnStage, SharedStage, Stage, TransportStage};
use crate::stages::{
    AffixOptions, AffixStage, DataHandlerStage, OptionsStage, ParamsStage, PayloadStage, ThrowNonOkStage,
};

pub const DEFAULT_ACCEPT: &str = "application/json, text/plain, */*";

#[derive(Clone)]
pub struct Client {
    stage: SharedStage,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    /// A client that sends every call straight to `transport`.
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self::build(TransportStage::new(transport))
    }

    /// A client over an arbitrary innermost stage.
    pub fn build(stage: impl Stage + 'static) -> Self {
        Self { stage: Arc::new(stage) }
    }

    /// A client over an async closure with the stage signature.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(String, RequestOptions) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<FetchResult, FetchError>> + Send + 'static,
    {
        Self::build(FnStage(f))
    }

    /// The conventional stack configured from `config`, outermost first:
    /// defaults, affix, params, payload, escalation, decoding, transport.
    pub fn standard(transport: impl Transport + 'static, config: &ClientConfig) -> Self {
        Client::new(transport)
            .with_data_handler(None)
            .with_throw_non_ok(config.throw_non_ok.unwrap_or(false))
            .with_payload(config.payload_type)
            .with_params(config.params.clone())
            .with_affix(AffixOptions {
                prefix: config.prefix.clone(),
                suffix: config.suffix.clone(),
            })
            .with_options(config.defaults())
    }

    /// Wrap the current pipeline with the stage returned by `wrap`.
    pub fn with<S, F>(&self, wrap: F) -> Client
    where
        S: Stage + 'static,
        F: FnOnce(SharedStage) -> S,
    {
        Client::build(wrap(Arc::clone(&self.stage)))
    }

    /// Prepend a prefix and insert a suffix before the query string.
    pub fn with_affix(&self, defaults: AffixOptions) -> Client {
        self.with(|inner| AffixStage { inner, defaults })
    }

    /// Merge default query parameters with per-call ones onto the URL.
    pub fn with_params(&self, defaults: Params) -> Client {
        self.with(|inner| ParamsStage { inner, defaults })
    }

    /// Encode `payload` into `body` for body-carrying methods.
    pub fn with_payload(&self, default_type: Option<PayloadType>) -> Client {
        self.with(|inner| PayloadStage { inner, default_type })
    }

    /// Turn non-2xx responses into `ERR_NON_OK_RESPONSE` errors when enabled.
    pub fn with_throw_non_ok(&self, default: bool) -> Client {
        self.with(|inner| ThrowNonOkStage { inner, default })
    }

    /// Decode the response body into `data`.
    pub fn with_data_handler(&self, default: Option<SharedDataHandler>) -> Client {
        self.with(|inner| DataHandlerStage { inner, default })
    }

    /// Merge `defaults` ahead of every call's options.
    pub fn with_options(&self, defaults: RequestOptions) -> Client {
        self.with(|inner| OptionsStage { inner, defaults })
    }

    /// Run one request through the pipeline.
    ///
    /// The method defaults to `GET` and an `accept` header is added unless the
    /// caller sets one.
    pub async fn request(&self, url: &str, mut options: RequestOptions) -> Result<FetchResult, FetchError> {
        if options.method.is_none() {
            options.method = Some("get".to_string());
        }
        if !has_header(&options.headers, "accept") {
            options.headers.insert("accept".to_string(), DEFAULT_ACCEPT.to_string());
        }
        self.stage.invoke(url.to_string(), options).await
    }
}
