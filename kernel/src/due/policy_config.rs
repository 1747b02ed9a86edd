// Due Policy Configuration
//
// Configurable rules for when a device counts as due for calibration.

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("invalid due policy: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Due-date policy loaded from JSON.
///
/// Keys are camelCase like the record schemas. Missing fields take their
/// default-policy values; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DuePolicy {
    /// Treat a device whose latest calibration failed as due, regardless of
    /// its next due date.
    #[serde(default)]
    pub failed_calibration_is_due: bool,
}

impl DuePolicy {
    /// Default built-in policy (used if no config is provided).
    ///
    /// Only the next due date of the latest calibration matters.
    pub fn default_policy() -> Self {
        Self {
            failed_calibration_is_due: false,
        }
    }

    pub fn from_json(data: &str) -> Result<Self, PolicyError> {
        Ok(serde_json::from_str(data)?)
    }
}
