//! Client configuration loaded from JSON.
//!
//! Keys are camelCase and every field is optional. An empty `payloadType`
//! string counts as unset.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::http::Headers;
use crate::options::{Params, PayloadType, RequestOptions};
use crate::platform::{ErrorClassifier, Platform};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub params: Params,
    pub headers: Headers,
    #[serde(deserialize_with = "blank_as_none")]
    pub payload_type: Option<PayloadType>,
    pub throw_non_ok: Option<bool>,
    /// Overall timeout applied by the reference transport.
    pub timeout_secs: Option<u64>,
    pub platform: Option<Platform>,
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Options merged ahead of every call by `Client::with_options`.
    pub fn defaults(&self) -> RequestOptions {
        RequestOptions {
            headers: self.headers.clone(),
            ..RequestOptions::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Failure classifier for the configured host platform, if any.
    pub fn classifier(&self) -> Option<Box<dyn ErrorClassifier>> {
        self.platform.map(|platform| platform.classifier())
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<PayloadType>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => PayloadType::deserialize(serde::de::value::StrDeserializer::<D::Error>::new(name)).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    #[test]
    fn parses_every_field() {
        let config = ClientConfig::from_json(
            r#"{
                "prefix": "https://api.example.com",
                "suffix": ".json",
                "params": {"lang": "en"},
                "headers": {"x-app": "demo"},
                "payloadType": "form",
                "throwNonOk": true,
                "timeoutSecs": 15,
                "platform": "alipay"
            }"#,
        )
        .unwrap();

        assert_eq!(config.prefix.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.suffix.as_deref(), Some(".json"));
        assert_eq!(config.params["lang"], json!("en"));
        assert_eq!(config.headers["x-app"], "demo");
        assert_eq!(config.payload_type, Some(PayloadType::Form));
        assert_eq!(config.throw_non_ok, Some(true));
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.platform, Some(Platform::Alipay));
    }

    #[test]
    fn empty_config_is_all_defaults() {
        let config = ClientConfig::from_json("{}").unwrap();
        assert!(config.prefix.is_none());
        assert!(config.params.is_empty());
        assert!(config.payload_type.is_none());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn blank_payload_type_is_unset() {
        let config = ClientConfig::from_json(r#"{"payloadType": ""}"#).unwrap();
        assert!(config.payload_type.is_none());
    }

    #[test]
    fn unknown_payload_type_is_rejected() {
        let err = ClientConfig::from_json(r#"{"payloadType": "xml"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn defaults_carry_headers_only() {
        let config = ClientConfig::from_json(r#"{"headers": {"x-app": "demo"}, "prefix": "/api"}"#).unwrap();
        let defaults = config.defaults();
        assert_eq!(defaults.headers["x-app"], "demo");
        assert!(defaults.prefix.is_none());
    }

    #[test]
    fn platform_selects_the_classifier() {
        use crate::platform::{ClassifyOptions, PlatformFailure, Prompt, Status};

        let options = ClassifyOptions::default();
        let alipay = ClientConfig::from_json(r#"{"platform": "alipay"}"#).unwrap();
        let classified = alipay.classifier().unwrap().classify(
            &PlatformFailure {
                error: Some(2001),
                ..PlatformFailure::default()
            },
            &options,
        );
        assert_eq!(classified.status, Status::Handled);
        assert_eq!(classified.prompt, Some(Prompt::Authorize));

        let weapp = ClientConfig::from_json(r#"{"platform": "weapp"}"#).unwrap();
        let classified = weapp.classifier().unwrap().classify(
            &PlatformFailure {
                err_msg: Some("getLocation:fail auth deny".to_string()),
                ..PlatformFailure::default()
            },
            &options,
        );
        assert_eq!(classified.status, Status::Handled);

        assert!(ClientConfig::from_json("{}").unwrap().classifier().is_none());
    }

    #[test]
    fn loads_from_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"throwNonOk": false}}"#).unwrap();
        let config = ClientConfig::from_path(file.path()).unwrap();
        assert_eq!(config.throw_non_ok, Some(false));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ClientConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
