use crate::error::{ErrorDispatchError, Result};
use dashmap::DashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

pub const ERROR_PATH_KEY: &str = "MESHESTRA_ERROR_PATH";
pub const INCLUDE_STACKTRACE_KEY: &str = "MESHESTRA_ERROR_INCLUDE_STACKTRACE";
pub const WHITELABEL_ENABLED_KEY: &str = "MESHESTRA_ERROR_WHITELABEL_ENABLED";

/// Configuration service
#[derive(Clone, Default)]
pub struct ConfigService {
    config: Arc<DashMap<String, String>>,
}

impl ConfigService {
    /// Create a service seeded from the process environment
    pub fn new() -> Self {
        let service = Self::default();
        for (key, value) in env::vars() {
            service.set(&key, &value);
        }
        service
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.config.get(key).map(|v| v.clone())
    }

    pub fn set(&self, key: &str, value: &str) {
        self.config.insert(key.to_string(), value.to_string());
    }
}

/// When to add the `trace` attribute to the error model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum IncludeStacktrace {
    #[default]
    Never,
    Always,
    OnTraceParam,
}

/// Settings for the error controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorProperties {
    /// Path the error controller is mounted on
    pub path: String,
    pub include_stacktrace: IncludeStacktrace,
    /// Install the built-in whitelabel page for the default `error` view
    pub whitelabel_enabled: bool,
}

impl Default for ErrorProperties {
    fn default() -> Self {
        Self {
            path: "/error".to_string(),
            include_stacktrace: IncludeStacktrace::Never,
            whitelabel_enabled: true,
        }
    }
}

impl ErrorProperties {
    /// Load properties, keeping defaults for unset keys
    pub fn from_config(config: &ConfigService) -> Result<Self> {
        let mut properties = Self::default();

        if let Some(path) = config.get(ERROR_PATH_KEY) {
            if !path.starts_with('/') {
                return Err(ErrorDispatchError::config(
                    ERROR_PATH_KEY,
                    format!("path must start with '/', got '{}'", path),
                ));
            }
            properties.path = path;
        }

        if let Some(value) = config.get(INCLUDE_STACKTRACE_KEY) {
            properties.include_stacktrace = IncludeStacktrace::from_str(value.trim())
                .map_err(|_| {
                    let expected: Vec<String> =
                        IncludeStacktrace::iter().map(|v| v.to_string()).collect();
                    ErrorDispatchError::config(
                        INCLUDE_STACKTRACE_KEY,
                        format!("expected one of {}, got '{}'", expected.join(", "), value),
                    )
                })?;
        }

        if let Some(value) = config.get(WHITELABEL_ENABLED_KEY) {
            properties.whitelabel_enabled = bool::from_str(&value.trim().to_ascii_lowercase())
                .map_err(|_| {
                    ErrorDispatchError::config(
                        WHITELABEL_ENABLED_KEY,
                        format!("expected true or false, got '{}'", value),
                    )
                })?;
        }

        tracing::debug!(
            path = %properties.path,
            include_stacktrace = %properties.include_stacktrace,
            whitelabel_enabled = properties.whitelabel_enabled,
            "Loaded error properties"
        );
        Ok(properties)
    }
}
