// Record Log Primitives
//
// Identifiers shared by every equipment history. A record is addressed by
// the device it belongs to and its 1-based position in that device's history.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod sequence;
pub mod store;

pub use sequence::SequenceCounter;
pub use store::{Attributed, RecordStore};

/// 1-based position of a record within one device's history.
pub type SequenceNumber = u64;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Opaque identifier naming one unit of equipment.
///
/// Numeric and named identifiers never compare equal, so `1` and `"1"`
/// address different devices.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceId {
    Numeric(u64),
    Named(String),
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceId::Numeric(id) => write!(f, "{id}"),
            DeviceId::Named(name) => f.write_str(name),
        }
    }
}

impl From<u64> for DeviceId {
    fn from(id: u64) -> Self {
        DeviceId::Numeric(id)
    }
}

impl From<&str> for DeviceId {
    fn from(name: &str) -> Self {
        DeviceId::Named(name.to_owned())
    }
}

impl From<String> for DeviceId {
    fn from(name: String) -> Self {
        DeviceId::Named(name)
    }
}

/// Composite address of a single record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub device: DeviceId,
    pub sequence: SequenceNumber,
}

impl RecordKey {
    pub fn new(device: DeviceId, sequence: SequenceNumber) -> Self {
        Self { device, sequence }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.device, self.sequence)
    }
}

/// Authenticated principal a write is attributed to.
///
/// Supplied by the hosting authorization layer and stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(pub String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn composite_keys_do_not_collide() {
        // As "device-sequence" strings, (11, 1) and (1, 11) would read
        // "11-1" and "1-11", and ("1-1", 1) would read "1-1-1".
        let a = RecordKey::new(DeviceId::from("1-1"), 1);
        let b = RecordKey::new(DeviceId::from("1"), 11);
        let c = RecordKey::new(DeviceId::from(11), 1);
        let d = RecordKey::new(DeviceId::from(1), 11);

        let keys: HashSet<_> = [a, b, c, d].into_iter().collect();
        assert_eq!(keys.len(), 4);
    }

    #[test]
    fn numeric_and_named_devices_differ() {
        assert_ne!(DeviceId::from(7), DeviceId::from("7"));
    }

    #[test]
    fn record_key_display_is_plain_text() {
        assert_eq!(
            RecordKey::new(DeviceId::from("ct-scanner-4"), 1).to_string(),
            "ct-scanner-4#1"
        );
        assert_eq!(RecordKey::new(DeviceId::from(7), 12).to_string(), "7#12");
    }

    #[test]
    fn device_id_json_is_untagged() {
        assert_eq!(serde_json::to_string(&DeviceId::from(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&DeviceId::from("infusion-pump")).unwrap(),
            "\"infusion-pump\""
        );

        let numeric: DeviceId = serde_json::from_str("42").unwrap();
        let named: DeviceId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(numeric, DeviceId::Numeric(42));
        assert_eq!(named, DeviceId::Named("42".into()));
    }

    #[test]
    fn principal_is_stored_verbatim() {
        let caller = Principal::new("ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG");
        assert_eq!(caller.as_str(), "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG");
        assert_eq!(
            serde_json::to_string(&caller).unwrap(),
            "\"ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG\""
        );
    }
}
