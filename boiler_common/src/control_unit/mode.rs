//! Operating mode of the control unit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level operating mode.
///
/// Exactly one mode is active at a time. `EmergencyStop` is absorbing: no
/// transition leaves it without external intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Mode {
    /// Waiting for the boiler and bringing the water level into the normal window.
    #[default]
    Initialization = 0,
    /// All units trusted, level regulated by the pumps.
    Normal = 1,
    /// At least one unit other than the level sensor is assumed broken.
    Degraded = 2,
    /// The level sensor is assumed broken.
    Rescue = 3,
    /// Plant shut down.
    EmergencyStop = 4,
}

impl Mode {
    /// All modes in discriminant order.
    pub const ALL: [Self; 5] = [
        Self::Initialization,
        Self::Normal,
        Self::Degraded,
        Self::Rescue,
        Self::EmergencyStop,
    ];

    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Initialization),
            1 => Some(Self::Normal),
            2 => Some(Self::Degraded),
            3 => Some(Self::Rescue),
            4 => Some(Self::EmergencyStop),
            _ => None,
        }
    }

    /// Whether the mode can never be left.
    #[inline]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::EmergencyStop)
    }

    /// Whether the plant is running (past initialization and not stopped).
    #[inline]
    pub const fn is_operating(self) -> bool {
        matches!(self, Self::Normal | Self::Degraded | Self::Rescue)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialization => "initialization",
            Self::Normal => "normal",
            Self::Degraded => "degraded",
            Self::Rescue => "rescue",
            Self::EmergencyStop => "emergency_stop",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
