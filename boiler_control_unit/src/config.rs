//! TOML configuration loader with validation.
//!
//! One file describes a plant: the `[shared]` section, the cycle settings
//! and the `[boiler]`, `[steam]` and `[pump]` constant tables. Every section
//! is optional and falls back to its defaults.
//!
//! ```toml
//! [shared]
//! log_level = "info"
//!
//! [cycle]
//! cycle_time_ms = 5000
//! abort_on_overrun = false
//! stop_cycles = 3
//!
//! [boiler]
//! capacity = 1000.0
//! max_limit = 900.0
//! max_normal = 700.0
//! min_normal = 300.0
//! min_limit = 100.0
//! ```

use std::path::Path;
use std::time::Duration;

use boiler_common::config::{ConfigError, ConfigLoader, SharedConfig};
use boiler_common::consts::{CYCLE_TIME_MS, STOP_CYCLES_DEFAULT};
use boiler_common::control_unit::constants::{
    BoilerConstants, Constants, PumpConstants, SteamConstants,
};
use serde::{Deserialize, Serialize};

// ─── Raw File Layout ────────────────────────────────────────────────

/// Cycle driver settings (`[cycle]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    /// Control cycle period [ms].
    pub cycle_time_ms: u64,
    /// Return from the loop on the first deadline overrun instead of
    /// logging it and carrying on.
    pub abort_on_overrun: bool,
    /// Consecutive cycles carrying `stop` that force an emergency stop.
    pub stop_cycles: u32,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            cycle_time_ms: CYCLE_TIME_MS,
            abort_on_overrun: false,
            stop_cycles: STOP_CYCLES_DEFAULT,
        }
    }
}

/// Plant configuration file as written on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoilerConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub cycle: CycleConfig,
    #[serde(default)]
    pub boiler: BoilerConstants,
    #[serde(default)]
    pub steam: SteamConstants,
    #[serde(default)]
    pub pump: PumpConstants,
}

// ─── Loaded Config Bundle ───────────────────────────────────────────

/// Complete validated configuration bundle, ready for runtime use.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub shared: SharedConfig,
    pub cycle: CycleConfig,
    pub constants: Constants,
}

impl LoadedConfig {
    /// Cycle period as a `Duration`.
    pub fn cycle_time(&self) -> Duration {
        self.constants.cycle_time
    }
}

impl BoilerConfig {
    /// Validate every section and bundle the result.
    pub fn into_loaded(self) -> Result<LoadedConfig, ConfigError> {
        self.shared.validate()?;
        if self.cycle.stop_cycles == 0 {
            return Err(ConfigError::ValidationError(
                "cycle.stop_cycles must be at least 1".to_string(),
            ));
        }
        let constants = Constants::new(
            self.boiler,
            self.steam,
            self.pump,
            Duration::from_millis(self.cycle.cycle_time_ms),
        )
        .map_err(|e| ConfigError::ValidationError(e.to_string()))?;

        Ok(LoadedConfig {
            shared: self.shared,
            cycle: self.cycle,
            constants,
        })
    }
}

// ─── Loading Functions ──────────────────────────────────────────────

/// Load and validate the plant configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    BoilerConfig::load(path)?.into_loaded()
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<LoadedConfig, ConfigError> {
    BoilerConfig::load_str(content)?.into_loaded()
}

// ─── Tests ──────────────────────────────────────────────────────────
