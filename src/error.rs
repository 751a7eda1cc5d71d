//! Errors that end a bridge run.
//!
//! Per-line problems (undecodable bytes, lines without a reading, failed
//! publishes) are reported as events and never surface here.

use crate::config::ConfigError;
use crate::port::PortError;
use thiserror::Error;

/// A specialized `Result` type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The device could not be opened. `available` lists the ports that were
    /// present at the time, for the operator.
    #[error("failed to connect to {port}: {source}")]
    Connect {
        port: String,
        #[source]
        source: PortError,
        available: Vec<String>,
    },

    /// The loop was started before a successful connect.
    #[error("bridge is not connected to a device")]
    NotConnected,

    /// The loop was started again after it stopped.
    #[error("bridge has already stopped")]
    AlreadyStopped,

    /// Reading from the device failed for a reason other than a timeout.
    #[error("failed to read from device: {0}")]
    Read(#[source] PortError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
