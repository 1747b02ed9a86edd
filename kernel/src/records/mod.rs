// Equipment Record Schemas
//
// The two concrete histories kept per device. Both share the append/get/latest
// contract of `RecordStore`; they never interact.

pub mod calibration;
pub mod usage;

pub use calibration::{CalibrationEntry, CalibrationLog, CalibrationRecord};
pub use usage::{UsageEntry, UsageLog, UsageRecord};
