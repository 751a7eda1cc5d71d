//! Port abstraction layer for the sensor device.
//!
//! Provides the connector (`connect`, `available_port_names`), the
//! `SerialPortAdapter` trait with its hardware and mock implementations, and
//! newline framing of the incoming byte stream.

pub mod error;
pub mod lines;
pub mod mock;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use lines::{decode_line, DecodeError, LineBuffer};
pub use mock::MockSerialPort;
pub use sync_port::{available_port_names, connect, SyncSerialPort};
pub use traits::*;
