//! Configuration for the bridge.
//!
//! # Configuration Resolution
//!
//! 1. `--config <path>` on the command line
//! 2. `PARKNET_BRIDGE_CONFIG` environment variable (explicit path)
//! 3. `./parknet-bridge.toml` (current directory)
//! 4. Built-in defaults (no file required)
//!
//! Environment variables (`PARKNET_SERIAL_PORT`, `PARKNET_SERIAL_BAUD_RATE`,
//! `PARKNET_REMOTE_URL`, `PARKNET_REMOTE_AUTH_TOKEN`, `PARKNET_LOG_LEVEL`)
//! override file values, and command-line flags override both. The
//! configuration is read once at startup.
//!
//! # Example
//!
//! ```rust,ignore
//! use parknet_bridge::config::ConfigLoader;
//!
//! let config = ConfigLoader::load()?.into_config()?;
//! println!("Reading {} at {} baud", config.serial.port, config.serial.baud_rate);
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{resolve_config_path, ConfigLoader, ConfigOverrides};
pub use schema::{BridgeConfig, LogFormat, LoggingConfig, RemoteConfig, SerialConfig};
