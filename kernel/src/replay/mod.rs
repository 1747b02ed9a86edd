// Snapshot Export & Validated Restore
//
// Exports a record store as its two logical mappings ({device -> count} and
// {(device, sequence) -> record}) and rebuilds a store from them, enforcing
// the history invariants before the state is accepted.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::invariants::{DeviceHistoryView, InvariantEngine, InvariantViolation};
use crate::log::{Attributed, DeviceId, RecordKey, RecordStore, SequenceCounter, SequenceNumber};

/// Errors that can occur during restore.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("snapshot decode failed: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("duplicate record key {0}")]
    DuplicateKey(RecordKey),

    #[error("duplicate count for device {0}")]
    DuplicateDevice(DeviceId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCount {
    pub device: DeviceId,
    pub count: SequenceNumber,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord<P> {
    pub key: RecordKey,
    pub record: P,
}

/// Point-in-time copy of a record store, ordered by device then sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSnapshot<P> {
    pub counts: Vec<DeviceCount>,
    pub records: Vec<SnapshotRecord<P>>,
}

impl<P: Serialize> LogSnapshot<P> {
    pub fn to_json(&self) -> Result<String, ReplayError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl<P: DeserializeOwned> LogSnapshot<P> {
    pub fn from_json(data: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(data)?)
    }
}

impl<P: Attributed> RecordStore<P> {
    /// Copy both mappings under a single read lock.
    pub fn snapshot(&self) -> LogSnapshot<P> {
        self.read_parts(|counter, records| {
            let mut counts: Vec<_> = counter
                .devices()
                .map(|(device, count)| DeviceCount {
                    device: device.clone(),
                    count,
                })
                .collect();
            counts.sort_by(|a, b| a.device.cmp(&b.device));

            let mut records: Vec<_> = records
                .iter()
                .map(|(key, record)| SnapshotRecord {
                    key: key.clone(),
                    record: record.clone(),
                })
                .collect();
            records.sort_by(|a, b| a.key.cmp(&b.key));

            LogSnapshot { counts, records }
        })
    }
}

/// Rebuild a record store from a snapshot.
///
/// Every device in the snapshot is checked against `invariants`; the first
/// violation aborts the restore and no store is produced.
pub fn restore<P: Attributed>(
    snapshot: LogSnapshot<P>,
    invariants: &InvariantEngine,
) -> Result<RecordStore<P>, ReplayError> {
    let mut counts: BTreeMap<DeviceId, SequenceNumber> = BTreeMap::new();
    for DeviceCount { device, count } in snapshot.counts {
        if counts.contains_key(&device) {
            return Err(ReplayError::DuplicateDevice(device));
        }
        counts.insert(device, count);
    }

    let mut sequences: BTreeMap<DeviceId, Vec<SequenceNumber>> = BTreeMap::new();
    let mut records = HashMap::with_capacity(snapshot.records.len());
    for SnapshotRecord { key, record } in snapshot.records {
        if records.contains_key(&key) {
            return Err(ReplayError::DuplicateKey(key));
        }
        sequences
            .entry(key.device.clone())
            .or_default()
            .push(key.sequence);
        records.insert(key, record);
    }

    // Devices that only appear on one side are checked with an empty
    // counterpart so a dangling count or record is caught.
    for device in sequences.keys() {
        counts.entry(device.clone()).or_insert(0);
    }

    let mut counter = SequenceCounter::new();
    for (device, count) in counts {
        let mut seqs = sequences.remove(&device).unwrap_or_default();
        seqs.sort_unstable();

        let history = DeviceHistoryView {
            device: &device,
            count,
            sequences: &seqs,
        };
        if let Err(violation) = invariants.evaluate(&history) {
            tracing::warn!(kind = P::KIND, device = %device, %violation, "snapshot rejected");
            return Err(violation.into());
        }

        counter.restore_count(device, count);
    }

    tracing::info!(
        kind = P::KIND,
        devices = counter.devices().count(),
        records = records.len(),
        "snapshot restored"
    );

    Ok(RecordStore::from_parts(counter, records))
}
