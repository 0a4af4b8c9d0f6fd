//! Composable HTTP request pipeline.
//!
//! # Overview
//! A `Client` is a stack of stages wrapped around one transport call. Each
//! stage is independent and order-sensitive: URL affixing, query-parameter
//! merging, payload encoding, non-2xx escalation, response decoding and
//! default-option merging. The transport itself is supplied by the host
//! through the `Transport` trait; `UreqTransport` is a ready-made one.
//!
//! # Design
//! - Every stage implements `Stage` and holds an `Arc` to the stage it wraps.
//!   `Client::with*` returns a new client and never mutates the receiver.
//! - Options are an explicit struct; merging is field by field with per-call
//!   values winning.
//! - Only the escalation and decode stages raise errors of their own, both as
//!   `ResponseError` with a machine-readable `ErrorCode`. Transport failures
//!   pass through unchanged.

pub mod client;
pub mod config;
pub mod encoding;
pub mod error;
pub mod handler;
pub mod http;
pub mod options;
pub mod platform;
pub mod stage;
pub mod stages;
#[cfg(feature = "ureq")]
pub mod transport;

pub use client::Client;
pub use config::{ClientConfig, ConfigError};
pub use error::{ErrorCode, FetchError, ResponseError, TransportError};
pub use handler::{DataHandler, DefaultDecode, SharedDataHandler};
pub use http::{
    FetchResult, Headers, RequestRecord, ResolvedRequest, ResponseBody, ResponseEnvelope, Transport, UploadPayload,
};
pub use options::{Body, Extra, Params, PayloadType, RequestOptions};
pub use platform::{Classification, ClassifyOptions, ErrorClassifier, Platform, PlatformFailure};
pub use stage::{FnStage, SharedStage, Stage};
pub use stages::AffixOptions;
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
