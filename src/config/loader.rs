//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::BridgeConfig;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "PARKNET";

/// Config file looked up in the working directory
const CONFIG_FILE_NAME: &str = "parknet-bridge.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "PARKNET_BRIDGE_CONFIG";

/// Values given on the command line. They win over file and environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub url: Option<String>,
    pub auth_token: Option<String>,
}

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: BridgeConfig,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `PARKNET_BRIDGE_CONFIG` environment variable (explicit path)
    /// 2. `./parknet-bridge.toml` (current directory)
    /// 3. Built-in defaults (no file required)
    ///
    /// Environment variables override file values.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = if let Some(ref path) = config_path {
            load_from_file(path)?
        } else {
            BridgeConfig::default()
        };

        apply_env_overrides(&mut config)?;

        Ok(Self { config_path, config })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(ConfigError::NotFound(path));
        }
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> ConfigResult<Self> {
        let mut config = BridgeConfig::default();
        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path: None,
            config,
        })
    }

    /// Apply command-line values on top of whatever was loaded.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(port) = overrides.port {
            self.config.serial.port = port;
        }
        if let Some(baud) = overrides.baud_rate {
            self.config.serial.baud_rate = baud;
        }
        if let Some(url) = overrides.url {
            self.config.remote.url = url;
        }
        if let Some(token) = overrides.auth_token {
            self.config.remote.auth_token = token;
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Validate and return the configuration.
    pub fn into_config(self) -> ConfigResult<BridgeConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    None
}

fn load_from_file(path: &Path) -> ConfigResult<BridgeConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// Apply environment variable overrides to the configuration.
///
/// - `PARKNET_SERIAL_PORT`, `PARKNET_SERIAL_BAUD_RATE`
/// - `PARKNET_REMOTE_URL`, `PARKNET_REMOTE_AUTH_TOKEN`
/// - `PARKNET_LOG_LEVEL`
fn apply_env_overrides(config: &mut BridgeConfig) -> ConfigResult<()> {
    if let Ok(val) = std::env::var(format!("{}_SERIAL_PORT", ENV_PREFIX)) {
        config.serial.port = val;
    }
    if let Ok(val) = std::env::var(format!("{}_SERIAL_BAUD_RATE", ENV_PREFIX)) {
        config.serial.baud_rate = val.parse().map_err(|_| {
            ConfigError::env_parse(
                format!("{}_SERIAL_BAUD_RATE", ENV_PREFIX),
                "Invalid baud rate",
            )
        })?;
    }

    if let Ok(val) = std::env::var(format!("{}_REMOTE_URL", ENV_PREFIX)) {
        config.remote.url = val;
    }
    if let Ok(val) = std::env::var(format!("{}_REMOTE_AUTH_TOKEN", ENV_PREFIX)) {
        config.remote.auth_token = val;
    }

    if let Ok(val) = std::env::var(format!("{}_LOG_LEVEL", ENV_PREFIX)) {
        config.logging.level = val;
    }

    Ok(())
}
