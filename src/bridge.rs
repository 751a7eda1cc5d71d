//! The poll loop tying device, parser, state and publisher together.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected --connect ok--> Running --shutdown / fatal read error--> Stopped
//!      |
//!      +--connect failed--> (error returned, loop never entered)
//! ```
//!
//! Everything runs on one task. A publish is awaited before the next line is
//! looked at, so a slow remote delays reading but never reorders readings.

use crate::config::{BridgeConfig, SerialConfig};
use crate::error::{BridgeError, BridgeResult};
use crate::events::{BridgeEvent, EventSink};
use crate::parser::parse_line;
use crate::port::{self, decode_line, LineBuffer, PortError, SerialPortAdapter, SyncSerialPort};
use crate::publisher::StatePublisher;
use crate::state::OccupancyState;
use std::future::Future;
use tracing::warn;

const READ_CHUNK: usize = 256;

/// Enumerates the serial ports present on the system.
pub type PortLister = fn() -> Result<Vec<String>, PortError>;

/// Where the bridge is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgePhase {
    Disconnected,
    Running,
    Stopped,
}

/// Result of one pass over the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing to read; the caller should back off.
    Idle,
    Processed {
        /// Complete lines taken from the buffer.
        lines: usize,
        /// Lines that produced a reading.
        readings: usize,
        /// Publishes that succeeded.
        published: usize,
    },
}

/// Serial-to-HTTP occupancy bridge.
pub struct Bridge<P, U, S> {
    config: BridgeConfig,
    port: Option<P>,
    lines: LineBuffer,
    read_buf: Vec<u8>,
    state: OccupancyState,
    publisher: U,
    sink: S,
    phase: BridgePhase,
    list_ports: PortLister,
}

impl<P, U, S> Bridge<P, U, S>
where
    P: SerialPortAdapter,
    U: StatePublisher,
    S: EventSink,
{
    pub fn new(config: BridgeConfig, publisher: U, sink: S) -> Self {
        let lines = LineBuffer::new(config.serial.max_line_length);
        Self {
            config,
            port: None,
            lines,
            read_buf: vec![0; READ_CHUNK],
            state: OccupancyState::new(),
            publisher,
            sink,
            phase: BridgePhase::Disconnected,
            list_ports: port::available_port_names,
        }
    }

    /// Replace the enumeration used to report available ports after a
    /// failed connect.
    pub fn with_port_lister(mut self, list_ports: PortLister) -> Self {
        self.list_ports = list_ports;
        self
    }

    /// Open the device with `open` and move to `Running`.
    ///
    /// On failure the currently present ports are listed alongside the cause.
    /// No retry is made.
    pub fn connect_with<F>(&mut self, open: F) -> BridgeResult<()>
    where
        F: FnOnce(&SerialConfig) -> Result<P, PortError>,
    {
        match self.phase {
            BridgePhase::Running => return Ok(()),
            BridgePhase::Stopped => return Err(BridgeError::AlreadyStopped),
            BridgePhase::Disconnected => {}
        }

        let serial = &self.config.serial;
        match open(serial) {
            Ok(port) => {
                self.sink.emit(BridgeEvent::Connected {
                    port: port.name().to_string(),
                    baud_rate: serial.baud_rate,
                });
                self.port = Some(port);
                self.phase = BridgePhase::Running;
                Ok(())
            }
            Err(source) => {
                let available = (self.list_ports)().unwrap_or_else(|e| {
                    warn!(error = %e, "could not enumerate serial ports");
                    Vec::new()
                });
                self.sink.emit(BridgeEvent::ConnectFailed {
                    port: serial.port.clone(),
                    reason: source.to_string(),
                    available: available.clone(),
                });
                Err(BridgeError::Connect {
                    port: serial.port.clone(),
                    source,
                    available,
                })
            }
        }
    }

    pub fn phase(&self) -> BridgePhase {
        self.phase
    }

    /// Latest known occupancy per slot.
    pub fn state(&self) -> &OccupancyState {
        &self.state
    }

    pub fn publisher(&self) -> &U {
        &self.publisher
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Read whatever the device has sent and handle every complete line.
    ///
    /// Timeouts count as "no data". Any other read error is fatal.
    pub async fn poll_once(&mut self) -> BridgeResult<PollOutcome> {
        let port = match self.phase {
            BridgePhase::Running => self.port.as_mut().ok_or(BridgeError::NotConnected)?,
            BridgePhase::Disconnected => return Err(BridgeError::NotConnected),
            BridgePhase::Stopped => return Err(BridgeError::AlreadyStopped),
        };

        if !self.lines.has_line() {
            if port.bytes_to_read() == Some(0) {
                return Ok(PollOutcome::Idle);
            }
            match port.read_bytes(&mut self.read_buf) {
                Ok(0) => return Ok(PollOutcome::Idle),
                Ok(n) => self.lines.extend(&self.read_buf[..n]),
                Err(e) if e.is_no_data() => return Ok(PollOutcome::Idle),
                Err(e) => return Err(BridgeError::Read(e)),
            }
        }

        let (mut lines, mut readings, mut published) = (0, 0, 0);
        while let Some(raw) = self.lines.next_line() {
            lines += 1;
            if let Some(ok) = self.handle_line(raw).await {
                readings += 1;
                if ok {
                    published += 1;
                }
            }
        }

        Ok(PollOutcome::Processed {
            lines,
            readings,
            published,
        })
    }

    /// Returns `None` when the line had no reading, otherwise whether the
    /// publish that followed succeeded.
    async fn handle_line(&mut self, raw: Vec<u8>) -> Option<bool> {
        let text = match decode_line(raw) {
            Ok(text) => text,
            Err(e) => {
                self.sink.emit(BridgeEvent::LineUndecodable {
                    len: e.len,
                    reason: e.to_string(),
                });
                return None;
            }
        };

        let line = text.trim();
        if line.is_empty() {
            return None;
        }
        self.sink.emit(BridgeEvent::LineReceived {
            line: line.to_string(),
        });

        let Some(reading) = parse_line(line) else {
            self.sink.emit(BridgeEvent::NoReading {
                line: line.to_string(),
            });
            return None;
        };

        let previous = self.state.apply(reading);
        self.sink
            .emit(BridgeEvent::ReadingAccepted { reading, previous });

        // The state keeps the reading whatever the outcome.
        match self.publisher.publish(&self.state).await {
            Ok(()) => {
                self.sink.emit(BridgeEvent::Published {
                    state: self.state.clone(),
                });
                Some(true)
            }
            Err(e) => {
                self.sink.emit(BridgeEvent::PublishFailed {
                    status: e.status_code(),
                    reason: e.to_string(),
                });
                Some(false)
            }
        }
    }

    /// Poll until `shutdown` resolves or a fatal error occurs.
    ///
    /// The device connection is released before returning on either path.
    pub async fn run<F>(&mut self, shutdown: F) -> BridgeResult<()>
    where
        F: Future<Output = ()>,
    {
        match self.phase {
            BridgePhase::Running => {}
            BridgePhase::Disconnected => return Err(BridgeError::NotConnected),
            BridgePhase::Stopped => return Err(BridgeError::AlreadyStopped),
        }

        let result = self.run_until(shutdown).await;
        self.stop();
        result
    }

    async fn run_until<F>(&mut self, shutdown: F) -> BridgeResult<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let poll_interval = self.config.serial.poll_interval();

        loop {
            let outcome = tokio::select! {
                _ = &mut shutdown => return Ok(()),
                outcome = self.poll_once() => outcome?,
            };

            if outcome == PollOutcome::Idle {
                tokio::select! {
                    _ = &mut shutdown => return Ok(()),
                    _ = tokio::time::sleep(poll_interval) => {}
                }
            }
        }
    }

    /// Close the device and enter `Stopped`. Idempotent.
    pub fn stop(&mut self) {
        if self.phase == BridgePhase::Stopped {
            return;
        }
        // Dropping the port closes the underlying handle.
        drop(self.port.take());
        self.lines.clear();
        self.phase = BridgePhase::Stopped;
        self.sink.emit(BridgeEvent::Stopped);
    }
}

impl<U, S> Bridge<SyncSerialPort, U, S>
where
    U: StatePublisher,
    S: EventSink,
{
    /// Open the configured hardware port.
    pub fn connect(&mut self) -> BridgeResult<()> {
        self.connect_with(|serial| {
            port::connect(&serial.port, serial.baud_rate, serial.read_timeout())
        })
    }
}
