//! Mock serial port implementation for testing.
//!
//! Provides a `MockSerialPort` that replays scripted device output without
//! requiring hardware. Clones share state, so a test can keep a handle and
//! feed more lines after handing the port to the bridge.

use super::error::PortError;
use super::traits::SerialPortAdapter;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Default)]
struct MockPortState {
    /// Queue of bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Whether the next read should time out.
    should_timeout: bool,
    /// Duration reported by simulated timeouts.
    timeout: Duration,
    /// Error kind the next read should fail with.
    fail_next_read: Option<std::io::ErrorKind>,
    /// Number of `read_bytes` calls, successful or not.
    read_calls: usize,
}

/// Mock serial port implementation for testing.
///
/// # Example
/// ```
/// use parknet_bridge::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_line("S1: 25.3 cm → OC");
///
/// let mut buffer = [0u8; 64];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert!(buffer[..n].ends_with(b"OC\n"));
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                timeout: Duration::from_millis(100),
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockPortState> {
        // A panicking test thread must not hide the queue from the others.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueue raw bytes to be returned by subsequent reads.
    pub fn enqueue_read(&mut self, data: &[u8]) {
        self.lock().read_queue.extend(data);
    }

    /// Enqueue one line of device output, terminated the way the firmware does.
    pub fn enqueue_line(&mut self, line: &str) {
        let mut state = self.lock();
        state.read_queue.extend(line.as_bytes());
        state.read_queue.push_back(b'\n');
    }

    /// Make the next read time out.
    pub fn set_should_timeout(&mut self, should_timeout: bool) {
        self.lock().should_timeout = should_timeout;
    }

    /// Make the next read fail with an I/O error of the given kind.
    pub fn fail_next_read(&mut self, kind: std::io::ErrorKind) {
        self.lock().fail_next_read = Some(kind);
    }

    /// Get the number of bytes available to read.
    pub fn available_bytes(&self) -> usize {
        self.lock().read_queue.len()
    }

    pub fn read_calls(&self) -> usize {
        self.lock().read_calls
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.lock();
        state.read_calls += 1;

        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::timeout(state.timeout));
        }

        if let Some(kind) = state.fail_next_read.take() {
            return Err(PortError::Io(std::io::Error::new(kind, "injected read failure")));
        }

        let mut bytes_read = 0;
        for byte in buffer.iter_mut() {
            if let Some(queued_byte) = state.read_queue.pop_front() {
                *byte = queued_byte;
                bytes_read += 1;
            } else {
                break;
            }
        }

        if bytes_read == 0 {
            Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "No data available",
            )))
        } else {
            Ok(bytes_read)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn bytes_to_read(&self) -> Option<usize> {
        let state = self.lock();
        // Pending failures must reach `read_bytes`, so report data as available.
        if state.should_timeout || state.fail_next_read.is_some() {
            return Some(state.read_queue.len().max(1));
        }
        Some(state.read_queue.len())
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_and_read() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_read(b"Hello");

        let mut buffer = [0u8; 10];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(n, 5);
        assert_eq!(&buffer[..n], b"Hello");
    }

    #[test]
    fn test_enqueue_line_appends_newline() {
        let mut port = MockSerialPort::new("MOCK0");
        port.enqueue_line("S2: 40.0 cm → FR");

        let mut buffer = [0u8; 64];
        let n = port.read_bytes(&mut buffer).unwrap();
        assert_eq!(&buffer[..n], "S2: 40.0 cm → FR\n".as_bytes());
    }

    #[test]
    fn test_timeout_simulation() {
        let mut port = MockSerialPort::new("MOCK0");
        port.set_should_timeout(true);
        assert_eq!(port.bytes_to_read(), Some(1));

        let mut buffer = [0u8; 10];
        let result = port.read_bytes(&mut buffer);
        assert!(matches!(result, Err(PortError::Timeout(_))));
    }

    #[test]
    fn test_injected_failure() {
        let mut port = MockSerialPort::new("MOCK0");
        port.fail_next_read(std::io::ErrorKind::BrokenPipe);

        let mut buffer = [0u8; 10];
        match port.read_bytes(&mut buffer) {
            Err(PortError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe),
            other => panic!("Expected BrokenPipe, got {other:?}"),
        }
        assert_eq!(port.read_calls(), 1);
    }

    #[test]
    fn test_empty_read() {
        let mut port = MockSerialPort::new("MOCK0");
        let mut buffer = [0u8; 10];

        let result = port.read_bytes(&mut buffer);
        if let Err(PortError::Io(e)) = result {
            assert_eq!(e.kind(), std::io::ErrorKind::WouldBlock);
        } else {
            panic!("Expected WouldBlock error");
        }
    }

    #[test]
    fn test_clones_share_queue() {
        let port = MockSerialPort::new("MOCK0");
        let mut feeder = port.clone();
        feeder.enqueue_read(b"abc");

        assert_eq!(port.bytes_to_read(), Some(3));
    }
}
