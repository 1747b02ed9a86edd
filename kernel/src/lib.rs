// Equilog Kernel
//
// Append-only, per-device equipment histories: calibration and usage
// records addressed by a gapless per-device sequence number.

pub mod due;
pub mod invariants;
pub mod log;
pub mod records;
pub mod replay;
