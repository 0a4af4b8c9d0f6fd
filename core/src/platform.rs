//! Classification of host platform failures (permission and location errors).
//!
//! # Design
//! Each host reports failures in its own shape: one platform uses a free-form
//! `errMsg` string, the other numeric `error` codes with an `errorMessage`.
//! An `ErrorClassifier` maps either shape onto a common `Classification`. The
//! variant is picked once, from configuration, via `Platform::classifier`.
//! Displaying the suggested `Prompt` is left to the host.

use serde::{Deserialize, Serialize};

pub const FAIL_AUTH: &str = "fail auth";
pub const FAIL_SYSTEM_PERMISSION: &str = "fail system permission denied";
pub const NO_SIGNAL: &str = "ERROR_NOCELL&WIFI_LOCATIONSWITCHOFF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Weapp,
    Alipay,
}

impl Platform {
    pub fn classifier(&self) -> Box<dyn ErrorClassifier> {
        match self {
            Platform::Weapp => Box::new(WeappClassifier),
            Platform::Alipay => Box::new(AlipayClassifier),
        }
    }
}

/// A failure as reported by the host platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformFailure {
    pub err_msg: Option<String>,
    pub error: Option<i64>,
    pub error_message: Option<String>,
    /// Result of probing the system location switch, when the host could.
    pub location_enabled: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifyOptions {
    /// Suggest a prompt for handled failures.
    pub modal: bool,
    pub check_system: bool,
    pub check_signal: bool,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            modal: true,
            check_system: true,
            check_signal: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Recognized permission or switch problem the user can fix.
    Handled = 0,
    Unhandled = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Ask the user to grant the permission in the app settings.
    Authorize,
    /// Ask the user to turn on the system location service for the host app.
    EnableLocationService,
    /// Ask the user to turn on GPS, cellular or Wi-Fi.
    EnableSignal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: Status,
    pub message: String,
    pub prompt: Option<Prompt>,
}

impl Classification {
    fn handled(message: impl Into<String>, prompt: Prompt, options: &ClassifyOptions) -> Self {
        Self {
            status: Status::Handled,
            message: message.into(),
            prompt: options.modal.then_some(prompt),
        }
    }

    fn unhandled(message: impl Into<String>) -> Self {
        Self {
            status: Status::Unhandled,
            message: message.into(),
            prompt: None,
        }
    }
}

pub trait ErrorClassifier: Send + Sync {
    fn classify(&self, failure: &PlatformFailure, options: &ClassifyOptions) -> Classification;
}

/// Classifier for hosts reporting `errMsg` strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeappClassifier;

impl ErrorClassifier for WeappClassifier {
    fn classify(&self, failure: &PlatformFailure, options: &ClassifyOptions) -> Classification {
        let err_msg = failure.err_msg.as_deref().unwrap_or_default();

        if err_msg.contains("fail auth") || err_msg.contains("fail:auth") {
            return Classification::handled(err_msg, Prompt::Authorize, options);
        }

        if options.check_system
            && (err_msg.contains("fail system permission denied") || err_msg.contains("fail:system permission denied"))
        {
            return Classification::handled(err_msg, Prompt::EnableLocationService, options);
        }

        if err_msg.contains(NO_SIGNAL) {
            if options.check_signal {
                return Classification::handled(err_msg, Prompt::EnableSignal, options);
            }
            if options.check_system && failure.location_enabled == Some(false) {
                return Classification::handled(err_msg, Prompt::EnableSignal, options);
            }
        }

        Classification::unhandled(err_msg)
    }
}

/// Classifier for hosts reporting numeric `error` codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlipayClassifier;

impl ErrorClassifier for AlipayClassifier {
    fn classify(&self, failure: &PlatformFailure, options: &ClassifyOptions) -> Classification {
        match failure.error {
            Some(2001..=2003) => Classification::handled(FAIL_AUTH, Prompt::Authorize, options),
            Some(11) if options.check_system => {
                Classification::handled(FAIL_SYSTEM_PERMISSION, Prompt::EnableLocationService, options)
            }
            Some(18) if options.check_signal => Classification::handled(NO_SIGNAL, Prompt::EnableSignal, options),
            _ => Classification::unhandled(failure.error_message.clone().unwrap_or_default()),
        }
    }
}
