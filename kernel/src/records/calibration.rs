// Calibration History
//
// Calibration records per device, plus due-date checks derived from the
// latest record.

use serde::{Deserialize, Serialize};

use crate::due::{DueDateChecker, DuePolicy, DueReport};
use crate::log::{Attributed, DeviceId, Principal, RecordStore, SequenceNumber, Timestamp};

/// A committed calibration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationRecord {
    pub date: Timestamp,
    pub performed_by: Principal,
    pub results: String,
    pub next_due_date: Timestamp,
    pub is_passed: bool,
}

/// Fields a technician submits. `performed_by` is attached on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalibrationEntry {
    pub date: Timestamp,
    pub results: String,
    pub next_due_date: Timestamp,
    pub is_passed: bool,
}

impl Attributed for CalibrationRecord {
    type Draft = CalibrationEntry;
    const KIND: &'static str = "calibration";

    fn attribute(entry: CalibrationEntry, caller: Principal) -> Self {
        Self {
            date: entry.date,
            performed_by: caller,
            results: entry.results,
            next_due_date: entry.next_due_date,
            is_passed: entry.is_passed,
        }
    }
}

#[derive(Debug, Default)]
pub struct CalibrationLog {
    store: RecordStore<CalibrationRecord>,
}

impl CalibrationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing store, e.g. one rebuilt by `replay::restore`.
    pub fn from_store(store: RecordStore<CalibrationRecord>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore<CalibrationRecord> {
        &self.store
    }

    /// Record a calibration performed by `caller`.
    ///
    /// Authorization of the caller is the host's responsibility.
    pub fn record_calibration(
        &self,
        device: &DeviceId,
        entry: CalibrationEntry,
        caller: Principal,
    ) -> SequenceNumber {
        self.store.append(device, entry, caller)
    }

    pub fn get_calibration(
        &self,
        device: &DeviceId,
        calibration_id: SequenceNumber,
    ) -> Option<CalibrationRecord> {
        self.store.get(device, calibration_id)
    }

    pub fn latest_calibration(&self, device: &DeviceId) -> Option<CalibrationRecord> {
        self.store.latest(device)
    }

    pub fn calibration_count(&self, device: &DeviceId) -> SequenceNumber {
        self.store.count(device)
    }

    pub fn calibration_history(
        &self,
        device: &DeviceId,
    ) -> Vec<(SequenceNumber, CalibrationRecord)> {
        self.store.history(device)
    }

    /// Whether the device needs calibrating as of `as_of`, under the
    /// default policy. Never-calibrated devices are always due.
    pub fn is_calibration_due(&self, device: &DeviceId, as_of: Timestamp) -> bool {
        self.is_calibration_due_with(device, as_of, &DuePolicy::default_policy())
    }

    pub fn is_calibration_due_with(
        &self,
        device: &DeviceId,
        as_of: Timestamp,
        policy: &DuePolicy,
    ) -> bool {
        DueDateChecker::new(&self.store, policy).is_due(device, as_of)
    }

    /// Due status of every listed device as of `as_of`.
    pub fn due_report<'a>(
        &self,
        devices: impl IntoIterator<Item = &'a DeviceId>,
        as_of: Timestamp,
        policy: &DuePolicy,
    ) -> DueReport {
        DueDateChecker::new(&self.store, policy).report(devices, as_of)
    }
}
