//! Plant constants (boiler geometry, steam and pump characteristics).
//!
//! Loaded once from configuration and immutable afterwards. All volumes are
//! in liters, all flows in liters per second.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::consts::{CYCLE_TIME_MS, CYCLE_TIME_MS_MAX, CYCLE_TIME_MS_MIN, MAX_PUMPS};

/// Rejected constant set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstantsError {
    #[error("{field} must be finite and non-negative, got {value}")]
    InvalidValue { field: &'static str, value: f64 },

    #[error(
        "boiler limits out of order: expected min_limit < min_normal < max_normal < max_limit <= capacity"
    )]
    LimitOrder,

    #[error("pump count {0} out of range [1, {max}]", max = MAX_PUMPS)]
    PumpCount(u8),

    #[error("cycle time {0} ms out of range [{min}, {max}]", min = CYCLE_TIME_MS_MIN, max = CYCLE_TIME_MS_MAX)]
    CycleTime(u64),
}

/// Water-level limits of the boiler [l].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoilerConstants {
    /// Total capacity.
    pub capacity: f64,
    /// Level above which the boiler is in danger.
    pub max_limit: f64,
    /// Upper end of the normal operating window.
    pub max_normal: f64,
    /// Lower end of the normal operating window.
    pub min_normal: f64,
    /// Level below which the boiler is in danger.
    pub min_limit: f64,
}

impl Default for BoilerConstants {
    fn default() -> Self {
        Self {
            capacity: 1000.0,
            max_limit: 900.0,
            max_normal: 700.0,
            min_normal: 300.0,
            min_limit: 100.0,
        }
    }
}

/// Steam output characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SteamConstants {
    /// Maximal steam output [l/s].
    pub max_throughput: f64,
    /// Maximal increase of the steam output per second [l/s²].
    pub max_gradient: f64,
    /// Maximal decrease of the steam output per second [l/s²].
    pub min_gradient: f64,
}

impl Default for SteamConstants {
    fn default() -> Self {
        Self {
            max_throughput: 25.0,
            max_gradient: 2.0,
            min_gradient: 2.0,
        }
    }
}

/// Feed pump characteristics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpConstants {
    /// Throughput of one open pump [l/s].
    pub capacity: f64,
    /// Number of pumps (and pump controllers) installed.
    #[serde(default = "default_pump_count")]
    pub count: u8,
}

fn default_pump_count() -> u8 {
    4
}

impl Default for PumpConstants {
    fn default() -> Self {
        Self {
            capacity: 10.0,
            count: default_pump_count(),
        }
    }
}

/// Validated, immutable plant constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constants {
    pub boiler: BoilerConstants,
    pub steam: SteamConstants,
    pub pump: PumpConstants,
    /// Nominal control cycle period.
    pub cycle_time: Duration,
}

impl Constants {
    /// Build a constant set, rejecting inconsistent values.
    pub fn new(
        boiler: BoilerConstants,
        steam: SteamConstants,
        pump: PumpConstants,
        cycle_time: Duration,
    ) -> Result<Self, ConstantsError> {
        let constants = Self {
            boiler,
            steam,
            pump,
            cycle_time,
        };
        constants.validate()?;
        Ok(constants)
    }

    /// Check every invariant of the constant set.
    pub fn validate(&self) -> Result<(), ConstantsError> {
        let b = &self.boiler;
        let s = &self.steam;
        for (field, value) in [
            ("boiler.capacity", b.capacity),
            ("boiler.max_limit", b.max_limit),
            ("boiler.max_normal", b.max_normal),
            ("boiler.min_normal", b.min_normal),
            ("boiler.min_limit", b.min_limit),
            ("steam.max_throughput", s.max_throughput),
            ("steam.max_gradient", s.max_gradient),
            ("steam.min_gradient", s.min_gradient),
            ("pump.capacity", self.pump.capacity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConstantsError::InvalidValue { field, value });
            }
        }

        let ordered = b.min_limit < b.min_normal
            && b.min_normal < b.max_normal
            && b.max_normal < b.max_limit
            && b.max_limit <= b.capacity;
        if !ordered {
            return Err(ConstantsError::LimitOrder);
        }

        if self.pump.count == 0 || self.pump.count as usize > MAX_PUMPS {
            return Err(ConstantsError::PumpCount(self.pump.count));
        }

        let ms = self.cycle_time.as_millis() as u64;
        if !(CYCLE_TIME_MS_MIN..=CYCLE_TIME_MS_MAX).contains(&ms) {
            return Err(ConstantsError::CycleTime(ms));
        }
        Ok(())
    }
}

impl Default for Constants {
    fn default() -> Self {
        Self {
            boiler: BoilerConstants::default(),
            steam: SteamConstants::default(),
            pump: PumpConstants::default(),
            cycle_time: Duration::from_millis(CYCLE_TIME_MS),
        }
    }
}
