//! ParkNet serial bridge library
//!
//! Reads parking-slot occupancy lines from a sensor device over a serial
//! link and mirrors the latest state of every slot to a remote JSON store
//! with an HTTP PUT.
//!
//! # Modules
//!
//! - `config`: Configuration with TOML and environment overrides
//! - `port`: Serial connector, mock port and line framing
//! - `parser`: Extraction of slot readings from device lines
//! - `state`: Latest occupancy per slot
//! - `publisher`: Remote store client
//! - `events`: Status reporting
//! - `bridge`: The poll loop
//! - `error`: Errors that end a run

pub mod bridge;
pub mod config;
pub mod error;
pub mod events;
pub mod parser;
pub mod port;
pub mod publisher;
pub mod state;

pub use bridge::{Bridge, BridgePhase, PollOutcome, PortLister};
pub use config::{BridgeConfig, ConfigError, ConfigLoader, ConfigOverrides, ConfigResult};
pub use error::{BridgeError, BridgeResult};
pub use events::{BridgeEvent, EventSink, RecordingSink, TracingSink};
pub use parser::{parse_line, NoMatch, SlotReading};
pub use port::{MockSerialPort, PortError, SerialPortAdapter, SyncSerialPort};
pub use publisher::{HttpPublisher, PublishError, StatePublisher};
pub use state::OccupancyState;
