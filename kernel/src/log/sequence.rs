// Per-Device Sequence Counter
//
// Tracks how many records each device has accumulated. The count doubles
// as the sequence number of the device's latest record.

use std::collections::HashMap;

use super::{DeviceId, SequenceNumber};

/// Record count per device. Unseen devices have a count of 0.
#[derive(Debug, Clone, Default)]
pub struct SequenceCounter {
    counts: HashMap<DeviceId, SequenceNumber>,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Advance the device's count by one and return the new value.
    ///
    /// # Panics
    ///
    /// Panics if the count is already `u64::MAX`. The counter cannot
    /// continue without reusing a sequence number.
    pub fn next_sequence(&mut self, device: &DeviceId) -> SequenceNumber {
        let count = self.counts.entry(device.clone()).or_insert(0);
        *count = count
            .checked_add(1)
            .unwrap_or_else(|| panic!("sequence counter overflowed for device {device}"));
        *count
    }

    /// Number of records appended for the device so far.
    pub fn current_count(&self, device: &DeviceId) -> SequenceNumber {
        self.counts.get(device).copied().unwrap_or(0)
    }

    /// Devices with a non-zero count, in no particular order.
    pub fn devices(&self) -> impl Iterator<Item = (&DeviceId, SequenceNumber)> {
        self.counts
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(device, count)| (device, *count))
    }

    /// Reinstate a previously persisted count.
    pub(crate) fn restore_count(&mut self, device: DeviceId, count: SequenceNumber) {
        if count > 0 {
            self.counts.insert(device, count);
        }
    }
}
