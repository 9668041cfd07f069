//! Bounded history of committed zones, used to recognise a departure.

use heapless::Vec;

use super::Zone;

/// Capacity of the history; also the length of the departure pattern.
pub const HISTORY_LEN: usize = 3;

/// A visitor who touched the installation, stepped back, then left.
pub const DEPARTURE_PATTERN: [Zone; HISTORY_LEN] = [Zone::Contact, Zone::Approach, Zone::Out];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneSequence {
    entries: Vec<Zone, HISTORY_LEN>,
}

impl ZoneSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `zone` unless it repeats the last entry, dropping the oldest
    /// entry when full.
    pub fn record(&mut self, zone: Zone) {
        if self.entries.last() == Some(&zone) {
            return;
        }
        if self.entries.is_full() {
            self.entries.remove(0);
        }
        // Room was made above.
        let _ = self.entries.push(zone);
    }

    /// True when the history is exactly [`DEPARTURE_PATTERN`].
    pub fn is_departure(&self) -> bool {
        self.entries.as_slice() == DEPARTURE_PATTERN
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn as_slice(&self) -> &[Zone] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
