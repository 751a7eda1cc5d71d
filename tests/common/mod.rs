//! Shared test utilities for the bridge integration tests.
//!
//! - `RecordingPublisher`: captures every published body, can be told to fail
//! - `test_config`: defaults with a fast poll interval
//! - `bridge_with_lines`: a connected bridge over a scripted mock port

#![allow(dead_code)]

use async_trait::async_trait;
use parknet_bridge::port::MockSerialPort;
use parknet_bridge::{
    Bridge, BridgeConfig, OccupancyState, PublishError, RecordingSink, StatePublisher,
};
use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Recorded {
    bodies: Vec<Value>,
    fail_with: Option<u16>,
}

/// Publisher that records each snapshot instead of sending it.
///
/// Clones share the record, so a test can keep a handle after moving one into
/// the bridge.
#[derive(Debug, Clone, Default)]
pub struct RecordingPublisher {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap()
    }

    /// Make every following publish fail with `status`.
    pub fn fail_with_status(&self, status: u16) {
        self.lock().fail_with = Some(status);
    }

    pub fn succeed(&self) {
        self.lock().fail_with = None;
    }

    /// Bodies of all attempts, failed ones included.
    pub fn bodies(&self) -> Vec<Value> {
        self.lock().bodies.clone()
    }

    pub fn calls(&self) -> usize {
        self.lock().bodies.len()
    }

    pub fn last_body(&self) -> Option<Value> {
        self.lock().bodies.last().cloned()
    }
}

#[async_trait]
impl StatePublisher for RecordingPublisher {
    async fn publish(&mut self, state: &OccupancyState) -> Result<(), PublishError> {
        let body = serde_json::to_value(state)?;
        let mut recorded = self.lock();
        recorded.bodies.push(body);
        match recorded.fail_with {
            Some(status) => Err(PublishError::Status {
                status,
                body: "simulated failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}

/// Default configuration with a short poll interval.
pub fn test_config() -> BridgeConfig {
    let mut config = BridgeConfig::default();
    config.serial.port = "MOCK0".to_string();
    config.serial.poll_interval_ms = 5;
    config
}

pub type MockBridge = Bridge<MockSerialPort, RecordingPublisher, RecordingSink>;

/// A running bridge whose device has already sent `lines`.
///
/// Returns the bridge plus handles to the port, publisher and sink.
pub fn bridge_with_lines(
    lines: &[&str],
) -> (MockBridge, MockSerialPort, RecordingPublisher, RecordingSink) {
    let mut port = MockSerialPort::new("MOCK0");
    for line in lines {
        port.enqueue_line(line);
    }
    let publisher = RecordingPublisher::new();
    let sink = RecordingSink::new();

    let mut bridge = Bridge::new(test_config(), publisher.clone(), sink.clone());
    let handle = port.clone();
    bridge
        .connect_with(move |_| Ok(port))
        .expect("mock connect cannot fail");

    (bridge, handle, publisher, sink)
}

/// Poll until the device has nothing more to offer.
pub async fn drain(bridge: &mut MockBridge) {
    for _ in 0..1000 {
        if bridge.poll_once().await.unwrap() == parknet_bridge::PollOutcome::Idle {
            return;
        }
    }
    panic!("bridge never went idle");
}
