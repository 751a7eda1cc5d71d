//! Configuration schema definitions.
//!
//! Every section has defaults equal to the values the bridge was deployed
//! with, so running without a file behaves like the field installation.

use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[cfg(windows)]
const DEFAULT_PORT: &str = "COM3";
#[cfg(not(windows))]
const DEFAULT_PORT: &str = "/dev/ttyUSB0";

const DEFAULT_URL: &str =
    "https://parknet-parking-default-rtdb.asia-southeast1.firebasedatabase.app/maharagama/slots.json";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Sensor device connection
    pub serial: SerialConfig,
    /// Remote store endpoint
    pub remote: RemoteConfig,
    /// Console logging
    pub logging: LoggingConfig,
}

impl BridgeConfig {
    /// Check value ranges the rest of the bridge relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        let serial = &self.serial;
        if serial.port.trim().is_empty() {
            return Err(ConfigError::validation("serial.port", "must not be empty"));
        }
        if serial.baud_rate == 0 {
            return Err(ConfigError::validation("serial.baud_rate", "must be non-zero"));
        }
        if !(1..1000).contains(&serial.read_timeout_ms) {
            return Err(ConfigError::validation(
                "serial.read_timeout_ms",
                "must be between 1 and 999 so reads never block the loop for a full second",
            ));
        }
        if serial.poll_interval_ms == 0 {
            return Err(ConfigError::validation(
                "serial.poll_interval_ms",
                "must be non-zero",
            ));
        }
        if serial.max_line_length == 0 {
            return Err(ConfigError::validation(
                "serial.max_line_length",
                "must be non-zero",
            ));
        }

        let url = self.remote.url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::validation(
                "remote.url",
                format!("'{url}' is not an http(s) URL"),
            ));
        }
        if self.remote.request_timeout_ms == Some(0) {
            return Err(ConfigError::validation(
                "remote.request_timeout_ms",
                "must be non-zero when set",
            ));
        }

        Ok(())
    }
}

/// Serial connection section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path or name, e.g. "/dev/ttyUSB0" or "COM3"
    pub port: String,
    pub baud_rate: u32,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Sleep between polls that find no data, in milliseconds
    pub poll_interval_ms: u64,
    /// Longest line held before it is flushed unterminated
    pub max_line_length: usize,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: 115_200,
            read_timeout_ms: 100,
            poll_interval_ms: 100,
            max_line_length: 1024,
        }
    }
}

impl SerialConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Remote store section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Full URL the state is PUT to
    pub url: String,
    /// Bearer token; empty disables the Authorization header
    pub auth_token: String,
    /// Optional whole-request timeout; the client default applies when unset
    pub request_timeout_ms: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            auth_token: String::new(),
            request_timeout_ms: None,
        }
    }
}

impl RemoteConfig {
    /// The token to send, if one is configured. Sent exactly as configured;
    /// a blank token means none.
    pub fn bearer_token(&self) -> Option<&str> {
        (!self.auth_token.trim().is_empty()).then_some(self.auth_token.as_str())
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    #[default]
    Pretty,
    /// Compact format
    Compact,
}
