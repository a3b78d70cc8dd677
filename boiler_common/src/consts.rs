//! System-wide constants for the boiler workspace.
//!
//! Single source of truth for numeric limits and default paths.

use static_assertions::const_assert;

/// Maximum number of pumps (and pump controllers) a plant may declare.
pub const MAX_PUMPS: usize = 8;

/// Default control cycle time in milliseconds (5 s).
pub const CYCLE_TIME_MS: u64 = 5_000;

/// Smallest accepted cycle time [ms].
pub const CYCLE_TIME_MS_MIN: u64 = 1;

/// Largest accepted cycle time [ms].
pub const CYCLE_TIME_MS_MAX: u64 = 60_000;

/// Consecutive cycles carrying `stop` that force an emergency stop.
pub const STOP_CYCLES_DEFAULT: u32 = 3;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/boiler.toml";

// Pump indices travel as `u8` on the wire.
const_assert!(MAX_PUMPS <= u8::MAX as usize);
const_assert!(CYCLE_TIME_MS_MIN <= CYCLE_TIME_MS && CYCLE_TIME_MS <= CYCLE_TIME_MS_MAX);
