//! Prelude module for common re-exports.
//!
//! `use boiler_common::prelude::*;` brings in the message alphabets, modes,
//! plant constants and configuration types.

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, SharedConfig};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CYCLE_TIME_MS, DEFAULT_CONFIG_PATH, MAX_PUMPS, STOP_CYCLES_DEFAULT};

// ─── Control Unit ───────────────────────────────────────────────────
pub use crate::control_unit::assumptions::{FailureAssumptions, PhysicalUnit};
pub use crate::control_unit::constants::{
    BoilerConstants, Constants, ConstantsError, PumpConstants, SteamConstants,
};
pub use crate::control_unit::messages::{
    PumpControlState, PumpState, ToProgram, ToProgramKind, ToUnits, ToUnitsKind, UnitId,
};
pub use crate::control_unit::mode::Mode;
