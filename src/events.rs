//! Status reporting for the bridge loop.
//!
//! The loop describes what happened as `BridgeEvent`s; an `EventSink`
//! decides how to present them. The binary logs through `tracing`, tests
//! record the events and assert on them.

use crate::parser::SlotReading;
use crate::state::OccupancyState;
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

/// Something the bridge did or ran into.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Connected {
        port: String,
        baud_rate: u32,
    },
    ConnectFailed {
        port: String,
        reason: String,
        available: Vec<String>,
    },
    /// A non-empty line arrived from the device.
    LineReceived {
        line: String,
    },
    /// A line was not valid UTF-8 and was dropped.
    LineUndecodable {
        len: usize,
        reason: String,
    },
    /// A line carried no reading.
    NoReading {
        line: String,
    },
    ReadingAccepted {
        reading: SlotReading,
        previous: Option<bool>,
    },
    Published {
        state: OccupancyState,
    },
    PublishFailed {
        status: Option<u16>,
        reason: String,
    },
    Stopped,
}

/// Receives bridge events as they happen.
pub trait EventSink: Send {
    fn emit(&mut self, event: BridgeEvent);
}

/// Writes events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::Connected { port, baud_rate } => {
                info!(%port, baud_rate, "connected to sensor device");
            }
            BridgeEvent::ConnectFailed {
                port,
                reason,
                available,
            } => {
                error!(%port, %reason, "failed to connect to sensor device");
                if available.is_empty() {
                    error!("no serial ports detected");
                } else {
                    error!("available ports: {}", available.join(", "));
                }
            }
            BridgeEvent::LineReceived { line } => info!(%line, "line from device"),
            BridgeEvent::LineUndecodable { len, reason } => {
                warn!(len, %reason, "dropped undecodable line");
            }
            BridgeEvent::NoReading { line } => debug!(%line, "no reading in line"),
            BridgeEvent::ReadingAccepted { reading, previous } => {
                debug!(
                    slot = reading.slot_id,
                    occupied = reading.occupied,
                    changed = previous != Some(reading.occupied),
                    "reading accepted"
                );
            }
            BridgeEvent::Published { state } => {
                info!(
                    slots = state.len(),
                    occupied = state.occupied_count(),
                    state = %state.to_json(),
                    "remote store updated"
                );
            }
            BridgeEvent::PublishFailed { status, reason } => match status {
                Some(status) => warn!(status, %reason, "remote store update failed"),
                None => warn!(%reason, "remote store update failed"),
            },
            BridgeEvent::Stopped => info!("bridge stopped, device connection closed"),
        }
    }
}

/// Keeps every event in memory. Clones share the same log.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<BridgeEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BridgeEvent> {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Events for which `pred` holds.
    pub fn count(&self, pred: impl Fn(&BridgeEvent) -> bool) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|e| pred(e))
            .count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: BridgeEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}
