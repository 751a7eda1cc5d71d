//! Latest known occupancy per slot.

use crate::parser::SlotReading;
use serde::Serialize;
use std::collections::BTreeMap;

/// Mapping from slot id to its most recent occupancy value.
///
/// Slots are only ever added or overwritten. Serializes as a JSON object keyed
/// by the decimal slot id, e.g. `{"1": false, "2": true}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OccupancyState {
    slots: BTreeMap<u32, bool>,
}

impl OccupancyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a reading into the state.
    ///
    /// Returns the previous value for the slot, if it had been seen before.
    pub fn apply(&mut self, reading: SlotReading) -> Option<bool> {
        self.slots.insert(reading.slot_id, reading.occupied)
    }

    pub fn get(&self, slot_id: u32) -> Option<bool> {
        self.slots.get(&slot_id).copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, bool)> + '_ {
        self.slots.iter().map(|(id, occupied)| (*id, *occupied))
    }

    /// Number of slots currently reported as occupied.
    pub fn occupied_count(&self) -> usize {
        self.slots.values().filter(|occupied| **occupied).count()
    }

    /// JSON body as sent to the remote store.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.slots
                .iter()
                .map(|(id, occupied)| (id.to_string(), serde_json::Value::Bool(*occupied)))
                .collect(),
        )
    }
}

impl FromIterator<SlotReading> for OccupancyState {
    fn from_iter<I: IntoIterator<Item = SlotReading>>(iter: I) -> Self {
        let mut state = Self::new();
        for reading in iter {
            state.apply(reading);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_latest_reading_wins() {
        let mut state = OccupancyState::new();
        assert_eq!(state.apply(SlotReading::new(1, true)), None);
        state.apply(SlotReading::new(2, false));
        assert_eq!(state.apply(SlotReading::new(1, false)), Some(true));

        assert_eq!(state.len(), 2);
        assert_eq!(state.get(1), Some(false));
        assert_eq!(state.get(2), Some(false));
        assert_eq!(state.get(3), None);
    }

    #[test]
    fn test_serializes_with_string_keys() {
        let state: OccupancyState = [SlotReading::new(12, true), SlotReading::new(3, false)]
            .into_iter()
            .collect();

        let body = serde_json::to_value(&state).unwrap();
        assert_eq!(body, json!({"3": false, "12": true}));
        assert_eq!(state.to_json(), body);
    }

    #[test]
    fn test_empty_state() {
        let state = OccupancyState::new();
        assert!(state.is_empty());
        assert_eq!(serde_json::to_string(&state).unwrap(), "{}");
    }

    #[test]
    fn test_occupied_count() {
        let state: OccupancyState = [
            SlotReading::new(1, true),
            SlotReading::new(2, true),
            SlotReading::new(3, false),
        ]
        .into_iter()
        .collect();
        assert_eq!(state.occupied_count(), 2);
        assert_eq!(state.iter().map(|(id, _)| id).collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
