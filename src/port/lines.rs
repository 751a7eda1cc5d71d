//! Newline framing for device output.
//!
//! Serial reads return arbitrary chunks; `LineBuffer` accumulates them and
//! hands back complete lines. Decoding to text is a separate step so a line
//! with invalid UTF-8 can be reported and skipped without losing its
//! neighbours.

use memchr::memchr;
use std::string::FromUtf8Error;
use thiserror::Error;

/// A line that is not valid UTF-8.
#[derive(Debug, Error)]
#[error("line is not valid UTF-8 ({len} bytes): {source}")]
pub struct DecodeError {
    pub len: usize,
    #[source]
    source: FromUtf8Error,
}

/// Accumulates raw bytes and splits them into `\n`-terminated lines.
#[derive(Debug)]
pub struct LineBuffer {
    buf: Vec<u8>,
    max_line_length: usize,
}

impl LineBuffer {
    /// `max_line_length` bounds how much unterminated data is held before it is
    /// flushed as a line of its own.
    pub fn new(max_line_length: usize) -> Self {
        Self {
            buf: Vec::with_capacity(max_line_length.min(4096)),
            max_line_length: max_line_length.max(1),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Pop the next complete line, without its terminator.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        match memchr(b'\n', &self.buf) {
            Some(pos) => {
                let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                Some(line)
            }
            None if self.buf.len() >= self.max_line_length => {
                Some(self.buf.drain(..self.max_line_length).collect())
            }
            None => None,
        }
    }

    /// Whether a complete line is waiting to be taken.
    pub fn has_line(&self) -> bool {
        self.buf.len() >= self.max_line_length || memchr(b'\n', &self.buf).is_some()
    }

    /// Bytes held for a line whose terminator has not arrived yet.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

/// Decode one line as UTF-8.
pub fn decode_line(bytes: Vec<u8>) -> Result<String, DecodeError> {
    let len = bytes.len();
    String::from_utf8(bytes).map_err(|source| DecodeError { len, source })
}
