//! The standard wrapping stages.
//!
//! Each stage holds its configured defaults plus the stage it decorates.
//! Per-call options always win over stage defaults.

use async_trait::async_trait;

use crate::encoding::{append_query, form_encode, insert_suffix};
use crate::error::{FetchError, ResponseError};
use crate::handler::{DefaultDecode, SharedDataHandler};
use crate::http::FetchResult;
use crate::options::{set_header, Body, Params, PayloadType, RequestOptions};
use crate::stage::{SharedStage, Stage};

pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// Defaults for the affix stage. `Some("")` disables an affix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AffixOptions {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

impl AffixOptions {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            suffix: None,
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

pub struct AffixStage {
    pub(crate) inner: SharedStage,
    pub(crate) defaults: AffixOptions,
}

#[async_trait]
impl Stage for AffixStage {
    async fn invoke(&self, mut url: String, options: RequestOptions) -> Result<FetchResult, FetchError> {
        let prefix = options.prefix.as_deref().or(self.defaults.prefix.as_deref());
        let suffix = options.suffix.as_deref().or(self.defaults.suffix.as_deref());

        if let Some(prefix) = prefix.filter(|p| !p.is_empty()) {
            url = format!("{prefix}{url}");
        }
        if let Some(suffix) = suffix.filter(|s| !s.is_empty()) {
            url = insert_suffix(&url, suffix);
        }

        tracing::trace!(url = %url, "affix applied");
        self.inner.invoke(url, options).await
    }
}

pub struct ParamsStage {
    pub(crate) inner: SharedStage,
    pub(crate) defaults: Params,
}

#[async_trait]
impl Stage for ParamsStage {
    async fn invoke(&self, url: String, mut options: RequestOptions) -> Result<FetchResult, FetchError> {
        if self.defaults.is_empty() && options.params.is_empty() {
            return self.inner.invoke(url, options).await;
        }

        let mut params = self.defaults.clone();
        params.extend(std::mem::take(&mut options.params));
        let url = append_query(&url, &params);
        options.params = params;

        tracing::trace!(url = %url, "query parameters applied");
        self.inner.invoke(url, options).await
    }
}

pub struct PayloadStage {
    pub(crate) inner: SharedStage,
    pub(crate) default_type: Option<PayloadType>,
}

#[async_trait]
impl Stage for PayloadStage {
    async fn invoke(&self, url: String, mut options: RequestOptions) -> Result<FetchResult, FetchError> {
        if !options.carries_payload() {
            return self.inner.invoke(url, options).await;
        }

        let Some(payload) = options.payload.clone().filter(|p| !p.is_null()) else {
            return self.inner.invoke(url, options).await;
        };

        let payload_type = options.payload_type.or(self.default_type).unwrap_or(PayloadType::Json);
        // The encoding decides the content-type; a caller-supplied one is
        // replaced, whatever its casing.
        let body = match payload_type {
            PayloadType::Json => {
                set_header(&mut options.headers, "content-type", JSON_CONTENT_TYPE);
                Body::Text(payload.to_string())
            }
            PayloadType::Form => {
                set_header(&mut options.headers, "content-type", FORM_CONTENT_TYPE);
                Body::Text(form_encode(&payload))
            }
            PayloadType::Multipart => Body::Value(payload),
        };
        options.body = Some(body);
        options.payload_type = Some(payload_type);

        tracing::trace!(?payload_type, "payload encoded");
        self.inner.invoke(url, options).await
    }
}

pub struct ThrowNonOkStage {
    pub(crate) inner: SharedStage,
    pub(crate) default: bool,
}

#[async_trait]
impl Stage for ThrowNonOkStage {
    async fn invoke(&self, url: String, options: RequestOptions) -> Result<FetchResult, FetchError> {
        let throw_non_ok = options.throw_non_ok.unwrap_or(self.default);
        let result = self.inner.invoke(url, options).await?;

        if throw_non_ok && !result.response.is_success() {
            tracing::debug!(
                status = result.response.status_code,
                url = %result.request.url,
                "escalating non-2xx response"
            );
            return Err(ResponseError::non_ok(result).into());
        }
        Ok(result)
    }
}

pub struct DataHandlerStage {
    pub(crate) inner: SharedStage,
    pub(crate) default: Option<SharedDataHandler>,
}

#[async_trait]
impl Stage for DataHandlerStage {
    async fn invoke(&self, url: String, options: RequestOptions) -> Result<FetchResult, FetchError> {
        let handler = options.data_handler.clone().or_else(|| self.default.clone());
        let result = self.inner.invoke(url, options).await?;

        let data = match handler {
            Some(handler) => handler.handle(&result, DefaultDecode).await?,
            None => DefaultDecode.decode(&result)?,
        };
        Ok(result.with_data(Some(data)))
    }
}

pub struct OptionsStage {
    pub(crate) inner: SharedStage,
    pub(crate) defaults: RequestOptions,
}

#[async_trait]
impl Stage for OptionsStage {
    async fn invoke(&self, url: String, options: RequestOptions) -> Result<FetchResult, FetchError> {
        let merged = self.defaults.merge(options);
        self.inner.invoke(url, merged).await
    }
}
