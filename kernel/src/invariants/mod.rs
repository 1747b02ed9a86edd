// Invariant Framework
//
// Invariants are pure rules every device history must satisfy. They are
// checked against persisted state *before* it is accepted into a store.

use crate::log::{DeviceId, SequenceNumber};

/// Result of invariant evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantResult {
    Pass,
    Fail(String),
}

/// One device's persisted count and the sequence numbers that hold a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHistoryView<'a> {
    pub device: &'a DeviceId,
    pub count: SequenceNumber,
    /// Sorted ascending, without duplicates.
    pub sequences: &'a [SequenceNumber],
}

/// Trait implemented by all invariants.
///
/// Invariants must be:
/// - Pure
/// - Deterministic
/// - Side-effect free
pub trait Invariant: Send + Sync {
    fn name(&self) -> &'static str;

    fn validate(&self, history: &DeviceHistoryView<'_>) -> InvariantResult;
}

/// Every stored record lies in `1..=count`.
pub struct SequenceWithinCount;

impl Invariant for SequenceWithinCount {
    fn name(&self) -> &'static str {
        "sequence-within-count"
    }

    fn validate(&self, history: &DeviceHistoryView<'_>) -> InvariantResult {
        match history
            .sequences
            .iter()
            .find(|&&seq| seq == 0 || seq > history.count)
        {
            Some(seq) => InvariantResult::Fail(format!(
                "device {} has a record at sequence {} but a count of {}",
                history.device, seq, history.count
            )),
            None => InvariantResult::Pass,
        }
    }
}

/// Every sequence number in `1..=count` holds a record.
pub struct NoSequenceGaps;

impl Invariant for NoSequenceGaps {
    fn name(&self) -> &'static str {
        "no-sequence-gaps"
    }

    fn validate(&self, history: &DeviceHistoryView<'_>) -> InvariantResult {
        let mut expected = 1;
        for &seq in history.sequences {
            if seq != expected {
                break;
            }
            expected += 1;
        }

        if expected > history.count {
            InvariantResult::Pass
        } else {
            InvariantResult::Fail(format!(
                "device {} is missing the record at sequence {} of {}",
                history.device, expected, history.count
            ))
        }
    }
}

/// Invariant engine that evaluates a set of invariants.
#[derive(Default)]
pub struct InvariantEngine {
    invariants: Vec<Box<dyn Invariant>>,
}

impl InvariantEngine {
    /// Create an engine with no invariants registered.
    pub fn new() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    /// Engine holding the invariants every record store upholds.
    pub fn standard() -> Self {
        let mut engine = Self::new();
        engine.register(SequenceWithinCount);
        engine.register(NoSequenceGaps);
        engine
    }

    /// Register an invariant.
    pub fn register<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    /// Evaluate all invariants.
    ///
    /// Stops at the first failure.
    pub fn evaluate(&self, history: &DeviceHistoryView<'_>) -> Result<(), InvariantViolation> {
        for invariant in &self.invariants {
            match invariant.validate(history) {
                InvariantResult::Pass => continue,
                InvariantResult::Fail(reason) => {
                    return Err(InvariantViolation {
                        invariant: invariant.name(),
                        reason,
                    })
                }
            }
        }
        Ok(())
    }
}

/// Returned when an invariant is violated.
#[derive(Debug, thiserror::Error)]
#[error("invariant `{invariant}` violated: {reason}")]
pub struct InvariantViolation {
    pub invariant: &'static str,
    pub reason: String,
}
