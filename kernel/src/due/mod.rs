// Calibration Due-Date Checks
//
// Decides whether a device needs calibrating as of a reference date.
// Derived purely from the latest calibration record; performs no writes.

use serde::Serialize;

use crate::log::{DeviceId, RecordStore, Timestamp};
use crate::records::CalibrationRecord;

pub mod policy_config;

pub use policy_config::{DuePolicy, PolicyError};

/// Why a device is due.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DueReason {
    /// No calibration has ever been recorded.
    NeverCalibrated,

    /// The reference date is on or after the latest next due date.
    #[serde(rename_all = "camelCase")]
    DueDateReached { next_due_date: Timestamp },

    /// The latest calibration failed and the policy treats that as due.
    FailedCalibration { date: Timestamp },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DueFinding {
    pub device: DeviceId,
    pub reason: DueReason,
}

/// Devices found due as of one reference date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueReport {
    pub as_of: Timestamp,
    pub findings: Vec<DueFinding>,
}

impl DueReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn devices(&self) -> impl Iterator<Item = &DeviceId> {
        self.findings.iter().map(|f| &f.device)
    }
}

/// Read-only view over a calibration store that answers due-date queries.
pub struct DueDateChecker<'a> {
    calibrations: &'a RecordStore<CalibrationRecord>,
    policy: &'a DuePolicy,
}

impl<'a> DueDateChecker<'a> {
    pub fn new(calibrations: &'a RecordStore<CalibrationRecord>, policy: &'a DuePolicy) -> Self {
        Self {
            calibrations,
            policy,
        }
    }

    /// `None` when the device is not due.
    pub fn status(&self, device: &DeviceId, as_of: Timestamp) -> Option<DueReason> {
        let reason = match self.calibrations.latest(device) {
            None => Some(DueReason::NeverCalibrated),
            // Inclusive: the due date itself counts as due.
            Some(latest) if as_of >= latest.next_due_date => Some(DueReason::DueDateReached {
                next_due_date: latest.next_due_date,
            }),
            Some(latest) if self.policy.failed_calibration_is_due && !latest.is_passed => {
                Some(DueReason::FailedCalibration { date: latest.date })
            }
            Some(_) => None,
        };

        tracing::trace!(device = %device, as_of, ?reason, "calibration due check");
        reason
    }

    pub fn is_due(&self, device: &DeviceId, as_of: Timestamp) -> bool {
        self.status(device, as_of).is_some()
    }

    pub fn report<'d>(
        &self,
        devices: impl IntoIterator<Item = &'d DeviceId>,
        as_of: Timestamp,
    ) -> DueReport {
        let findings = devices
            .into_iter()
            .filter_map(|device| {
                self.status(device, as_of).map(|reason| DueFinding {
                    device: device.clone(),
                    reason,
                })
            })
            .collect();

        DueReport { as_of, findings }
    }
}
