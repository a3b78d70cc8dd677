//! Safety module root.
//!
//! Level thresholds that decide between regulation, Rescue and
//! EmergencyStop, and per-cycle failure detection for every unit class.

pub mod detection;
pub mod thresholds;
