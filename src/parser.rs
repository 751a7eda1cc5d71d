//! Sensor line parser.
//!
//! The firmware prints one line per slot and measurement, for example
//! `S1: 25.3 cm → OC`. Only the slot number and the status token carry
//! information; the distance is matched so that unrelated lines containing
//! `OC`/`FR` are not mistaken for readings.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// `S<slot>: <distance> cm <arrow> <token>`, whitespace optional between parts.
static READING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"S([0-9]+):\s*[0-9.]+\s*cm\s*(?:→|➔|➜|⟶|->|>)\s*(\w+)")
        .expect("reading pattern is a valid regex")
});

/// One occupancy reading taken from a device line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotReading {
    pub slot_id: u32,
    pub occupied: bool,
}

impl SlotReading {
    pub fn new(slot_id: u32, occupied: bool) -> Self {
        Self { slot_id, occupied }
    }
}

impl fmt::Display for SlotReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.occupied { "occupied" } else { "free" };
        write!(f, "slot {} {}", self.slot_id, status)
    }
}

/// The line does not carry a usable reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("line does not contain a slot reading")]
pub struct NoMatch;

/// Status token as printed by the firmware.
fn occupancy_from_token(token: &str) -> Option<bool> {
    match token {
        "OC" => Some(true),
        "FR" => Some(false),
        // "--" means the sensor could not measure.
        _ => None,
    }
}

/// Extract a reading from one trimmed or untrimmed line.
///
/// Returns `None` when the line has a different shape, the status token is
/// not `OC`/`FR`, or the slot number is zero or out of range.
pub fn parse_line(line: &str) -> Option<SlotReading> {
    let caps = READING_RE.captures(line)?;
    let slot_id: u32 = caps.get(1)?.as_str().parse().ok()?;
    if slot_id == 0 {
        return None;
    }
    let occupied = occupancy_from_token(caps.get(2)?.as_str())?;
    Some(SlotReading { slot_id, occupied })
}

impl FromStr for SlotReading {
    type Err = NoMatch;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s).ok_or(NoMatch)
    }
}
