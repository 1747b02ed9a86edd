// Usage History
//
// One record per clinical use of a device.

use serde::{Deserialize, Serialize};

use crate::log::{Attributed, DeviceId, Principal, RecordStore, SequenceNumber, Timestamp};

/// A committed usage log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub user: Principal,
    pub purpose: String,
    pub patient_id: String,
    pub notes: String,
}

/// Fields a clinician submits. `user` is attached on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageEntry {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub purpose: String,
    pub patient_id: String,
    pub notes: String,
}

impl Attributed for UsageRecord {
    type Draft = UsageEntry;
    const KIND: &'static str = "usage";

    fn attribute(entry: UsageEntry, caller: Principal) -> Self {
        Self {
            start_time: entry.start_time,
            end_time: entry.end_time,
            user: caller,
            purpose: entry.purpose,
            patient_id: entry.patient_id,
            notes: entry.notes,
        }
    }
}

#[derive(Debug, Default)]
pub struct UsageLog {
    store: RecordStore<UsageRecord>,
}

impl UsageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_store(store: RecordStore<UsageRecord>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore<UsageRecord> {
        &self.store
    }

    pub fn log_usage(
        &self,
        device: &DeviceId,
        entry: UsageEntry,
        caller: Principal,
    ) -> SequenceNumber {
        self.store.append(device, entry, caller)
    }

    pub fn get_usage_log(&self, device: &DeviceId, log_id: SequenceNumber) -> Option<UsageRecord> {
        self.store.get(device, log_id)
    }

    pub fn usage_count(&self, device: &DeviceId) -> SequenceNumber {
        self.store.count(device)
    }

    pub fn latest_usage(&self, device: &DeviceId) -> Option<UsageRecord> {
        self.store.latest(device)
    }

    pub fn usage_history(&self, device: &DeviceId) -> Vec<(SequenceNumber, UsageRecord)> {
        self.store.history(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor1() -> Principal {
        Principal::new("ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG")
    }

    fn doctor2() -> Principal {
        Principal::new("ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC")
    }

    fn entry(start_time: Timestamp, purpose: &str, patient_id: &str, notes: &str) -> UsageEntry {
        UsageEntry {
            start_time,
            end_time: start_time + 3600,
            purpose: purpose.into(),
            patient_id: patient_id.into(),
            notes: notes.into(),
        }
    }

    #[test]
    fn log_and_fetch_usage() {
        let log = UsageLog::new();
        let device = DeviceId::from(1);

        let id = log.log_usage(
            &device,
            entry(1620000000, "Diagnostic scan", "P12345", "Routine scan for patient follow-up"),
            doctor1(),
        );

        assert_eq!(id, 1);
        assert_eq!(log.usage_count(&device), 1);
        assert_eq!(
            log.get_usage_log(&device, 1),
            Some(UsageRecord {
                start_time: 1620000000,
                end_time: 1620003600,
                user: doctor1(),
                purpose: "Diagnostic scan".into(),
                patient_id: "P12345".into(),
                notes: "Routine scan for patient follow-up".into(),
            })
        );
    }

    #[test]
    fn count_and_latest_after_two_usages() {
        let log = UsageLog::new();
        let device = DeviceId::from(1);

        log.log_usage(&device, entry(1620000000, "Scan 1", "P12345", "Notes 1"), doctor1());
        log.log_usage(&device, entry(1620100000, "Scan 2", "P67890", "Notes 2"), doctor2());

        assert_eq!(log.usage_count(&device), 2);
        assert_eq!(
            log.latest_usage(&device),
            Some(UsageRecord {
                start_time: 1620100000,
                end_time: 1620103600,
                user: doctor2(),
                purpose: "Scan 2".into(),
                patient_id: "P67890".into(),
                notes: "Notes 2".into(),
            })
        );
        assert!(log.latest_usage(&DeviceId::from(2)).is_none());
        assert_eq!(log.usage_count(&DeviceId::from(2)), 0);
    }

    #[test]
    fn missing_usage_log_is_absent() {
        let log = UsageLog::new();
        log.log_usage(&DeviceId::from(1), entry(1620000000, "Scan", "P1", ""), doctor1());

        assert!(log.get_usage_log(&DeviceId::from(1), 2).is_none());
        assert!(log.get_usage_log(&DeviceId::from(2), 1).is_none());
    }

    #[test]
    fn history_preserves_order() {
        let log = UsageLog::new();
        let device = DeviceId::from("mri-2");

        log.log_usage(&device, entry(1, "Scan 1", "P1", ""), doctor1());
        log.log_usage(&device, entry(2, "Scan 2", "P2", ""), doctor2());

        let purposes: Vec<_> = log
            .usage_history(&device)
            .into_iter()
            .map(|(id, record)| (id, record.purpose))
            .collect();
        assert_eq!(purposes, vec![(1, "Scan 1".to_string()), (2, "Scan 2".to_string())]);
    }
}
