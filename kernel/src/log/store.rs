// Generic Record Store
//
// Append-only storage addressed by (device, sequence). The counter and the
// record map sit behind one lock, so an append is observed either fully
// (count advanced and payload present) or not at all.
//
// Properties:
// - Append-only, no update or delete
// - Sequence numbers per device are exactly 1..=count
// - Latest record is the one at (device, count)

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{DeviceId, Principal, RecordKey, SequenceCounter, SequenceNumber};

/// A record schema that carries the identity of whoever wrote it.
///
/// Callers hand the store a `Draft`; the store attaches the caller
/// identity when the record is committed.
pub trait Attributed: Clone {
    /// Caller-supplied fields of the record.
    type Draft;

    /// Short label used in log output.
    const KIND: &'static str;

    fn attribute(draft: Self::Draft, caller: Principal) -> Self;
}

#[derive(Debug)]
struct StoreState<P> {
    counter: SequenceCounter,
    records: HashMap<RecordKey, P>,
}

/// Append-only history of records per device.
#[derive(Debug)]
pub struct RecordStore<P> {
    state: RwLock<StoreState<P>>,
}

impl<P: Attributed> RecordStore<P> {
    pub fn new() -> Self {
        Self::from_parts(SequenceCounter::new(), HashMap::new())
    }

    pub(crate) fn from_parts(counter: SequenceCounter, records: HashMap<RecordKey, P>) -> Self {
        Self {
            state: RwLock::new(StoreState { counter, records }),
        }
    }

    /// Append a record for the device and return its sequence number.
    ///
    /// The returned number is strictly greater than every number previously
    /// returned for this device.
    pub fn append(&self, device: &DeviceId, draft: P::Draft, caller: Principal) -> SequenceNumber {
        let record = P::attribute(draft, caller);

        let sequence = {
            let mut state = self.state.write();
            let sequence = state.counter.next_sequence(device);
            state.records.insert(RecordKey::new(device.clone(), sequence), record);
            sequence
        };

        tracing::debug!(kind = P::KIND, device = %device, sequence, "record appended");
        sequence
    }

    /// Fetch one record. Unknown devices and out-of-range sequence numbers
    /// both yield `None`.
    pub fn get(&self, device: &DeviceId, sequence: SequenceNumber) -> Option<P> {
        if sequence == 0 {
            return None;
        }

        let state = self.state.read();
        state
            .records
            .get(&RecordKey::new(device.clone(), sequence))
            .cloned()
    }

    /// The record at the device's current count, if any.
    pub fn latest(&self, device: &DeviceId) -> Option<P> {
        let state = self.state.read();
        let count = state.counter.current_count(device);
        if count == 0 {
            return None;
        }

        state
            .records
            .get(&RecordKey::new(device.clone(), count))
            .cloned()
    }

    pub fn count(&self, device: &DeviceId) -> SequenceNumber {
        self.state.read().counter.current_count(device)
    }

    /// All records of one device in ascending sequence order.
    pub fn history(&self, device: &DeviceId) -> Vec<(SequenceNumber, P)> {
        let state = self.state.read();
        let count = state.counter.current_count(device);

        (1..=count)
            .filter_map(|sequence| {
                state
                    .records
                    .get(&RecordKey::new(device.clone(), sequence))
                    .map(|record| (sequence, record.clone()))
            })
            .collect()
    }

    /// Devices with at least one record, in ascending order.
    pub fn devices(&self) -> Vec<DeviceId> {
        let state = self.state.read();
        let mut devices: Vec<_> = state
            .counter
            .devices()
            .map(|(device, _)| device.clone())
            .collect();
        devices.sort();
        devices
    }

    /// Run `f` against one consistent view of the counter and records.
    pub(crate) fn read_parts<R>(
        &self,
        f: impl FnOnce(&SequenceCounter, &HashMap<RecordKey, P>) -> R,
    ) -> R {
        let state = self.state.read();
        f(&state.counter, &state.records)
    }
}

impl<P: Attributed> Default for RecordStore<P> {
    fn default() -> Self {
        Self::new()
    }
}
